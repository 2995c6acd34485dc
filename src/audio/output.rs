use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{audio::pcm::NarrationClip, foundation::error::PanelResult};

/// Handle to one in-flight playback, allocated by the [`AudioOutput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaybackId(pub u64);

/// Process-wide audio output context.
///
/// The overlay controller opens it lazily, keeps at most one playback in flight, and closes it
/// exactly once on teardown.
pub trait AudioOutput {
    /// Create the output context at `sample_rate`.
    fn open(&mut self, sample_rate: u32) -> PanelResult<()>;

    /// Begin playing `clip` immediately.
    fn start(&mut self, clip: &NarrationClip) -> PanelResult<PlaybackId>;

    /// Stop a playback. Stopping a finished or unknown playback is not an error.
    fn stop(&mut self, id: PlaybackId) -> PanelResult<()>;

    /// Next playback that reached its natural end, if any.
    fn poll_finished(&mut self) -> Option<PlaybackId> {
        None
    }

    /// Release the output context.
    fn close(&mut self);
}

/// Observable effect on an [`AudioOutput`].
#[derive(Clone, Debug, PartialEq)]
pub enum AudioEvent {
    Opened { sample_rate: u32 },
    Started { id: PlaybackId, samples: usize },
    Stopped { id: PlaybackId },
    Closed,
}

#[derive(Debug, Default)]
struct AudioLogState {
    events: Vec<AudioEvent>,
    live: Vec<PlaybackId>,
    finished: VecDeque<PlaybackId>,
    next_id: u64,
}

/// Shared view into a [`RecordingAudioOutput`], kept by whoever drives the session.
#[derive(Clone, Debug, Default)]
pub struct AudioLog(Rc<RefCell<AudioLogState>>);

impl AudioLog {
    pub fn events(&self) -> Vec<AudioEvent> {
        self.0.borrow().events.clone()
    }

    /// Playbacks started and not yet stopped or finished.
    pub fn live_playbacks(&self) -> Vec<PlaybackId> {
        self.0.borrow().live.clone()
    }

    pub fn count(&self, pred: impl Fn(&AudioEvent) -> bool) -> usize {
        self.0.borrow().events.iter().filter(|e| pred(e)).count()
    }

    /// Simulate playback `id` reaching its natural end.
    pub fn finish(&self, id: PlaybackId) {
        let mut s = self.0.borrow_mut();
        if let Some(pos) = s.live.iter().position(|x| *x == id) {
            s.live.remove(pos);
            s.finished.push_back(id);
        }
    }
}

/// Output that plays nothing and records every call. Used by tests and by `panelcast replay`.
#[derive(Debug, Default)]
pub struct RecordingAudioOutput {
    log: AudioLog,
}

impl RecordingAudioOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> AudioLog {
        self.log.clone()
    }
}

impl AudioOutput for RecordingAudioOutput {
    fn open(&mut self, sample_rate: u32) -> PanelResult<()> {
        tracing::info!(sample_rate, "audio context opened");
        self.log
            .0
            .borrow_mut()
            .events
            .push(AudioEvent::Opened { sample_rate });
        Ok(())
    }

    fn start(&mut self, clip: &NarrationClip) -> PanelResult<PlaybackId> {
        let mut s = self.log.0.borrow_mut();
        s.next_id += 1;
        let id = PlaybackId(s.next_id);
        s.live.push(id);
        s.events.push(AudioEvent::Started {
            id,
            samples: clip.samples.len(),
        });
        tracing::info!(
            playback = id.0,
            seconds = clip.duration_sec(),
            "narration started"
        );
        Ok(id)
    }

    fn stop(&mut self, id: PlaybackId) -> PanelResult<()> {
        let mut s = self.log.0.borrow_mut();
        s.live.retain(|x| *x != id);
        s.events.push(AudioEvent::Stopped { id });
        tracing::info!(playback = id.0, "narration stopped");
        Ok(())
    }

    fn poll_finished(&mut self) -> Option<PlaybackId> {
        self.log.0.borrow_mut().finished.pop_front()
    }

    fn close(&mut self) {
        let mut s = self.log.0.borrow_mut();
        s.live.clear();
        s.events.push(AudioEvent::Closed);
        tracing::info!("audio context closed");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/output.rs"]
mod tests;
