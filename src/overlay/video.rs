use std::{cell::RefCell, rc::Rc};

/// Playback control over the video overlays of a scene, addressed by target index.
pub trait VideoControl {
    /// Seek the video bound to `target_index` to zero and play it.
    fn restart(&mut self, target_index: usize);

    /// Pause the video bound to `target_index`, keeping its position.
    fn pause(&mut self, target_index: usize);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoEvent {
    Restarted(usize),
    Paused(usize),
}

/// Shared view into a [`RecordingVideoControl`].
#[derive(Clone, Debug, Default)]
pub struct VideoLog(Rc<RefCell<Vec<VideoEvent>>>);

impl VideoLog {
    pub fn events(&self) -> Vec<VideoEvent> {
        self.0.borrow().clone()
    }

    pub fn restarts(&self, target_index: usize) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| **e == VideoEvent::Restarted(target_index))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct RecordingVideoControl {
    log: VideoLog,
}

impl RecordingVideoControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> VideoLog {
        self.log.clone()
    }
}

impl VideoControl for RecordingVideoControl {
    fn restart(&mut self, target_index: usize) {
        tracing::info!(target_index, "video restarted");
        self.log.0.borrow_mut().push(VideoEvent::Restarted(target_index));
    }

    fn pause(&mut self, target_index: usize) {
        tracing::info!(target_index, "video paused");
        self.log.0.borrow_mut().push(VideoEvent::Paused(target_index));
    }
}
