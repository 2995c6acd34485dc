use std::sync::Arc;

use crate::{
    audio::{
        output::{AudioOutput, PlaybackId},
        pcm,
    },
    foundation::error::PanelResult,
    lifecycle::AudioContextSlot,
    overlay::video::VideoControl,
    scene::model::{ComicPage, CompiledScene},
};

/// Runtime-only recognition state. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecognitionSession {
    pub active_page_index: Option<usize>,
    pub is_narration_playing: bool,
    pub previous_active_index: Option<usize>,
}

/// Narration restarts whenever the found target differs from the previously found one.
///
/// Re-finding the same target (even after losing it) does not restart; switching away and back
/// does.
pub fn should_restart_narration(new_index: usize, previous_index: Option<usize>) -> bool {
    previous_index != Some(new_index)
}

/// Per-page side effects of recognition events.
///
/// The controller is the only owner of the current playback reference. Audio and video failures
/// are logged and swallowed so that a bad narration payload never stalls the recognition loop.
pub struct OverlayController {
    scene: Arc<CompiledScene>,
    audio: Box<dyn AudioOutput>,
    video: Box<dyn VideoControl>,
    audio_ctx: AudioContextSlot,
    session: RecognitionSession,
    current: Option<PlaybackId>,
    sample_rate: u32,
}

impl OverlayController {
    pub fn new(
        scene: Arc<CompiledScene>,
        audio: Box<dyn AudioOutput>,
        video: Box<dyn VideoControl>,
        sample_rate: u32,
    ) -> Self {
        Self {
            scene,
            audio,
            video,
            audio_ctx: AudioContextSlot::default(),
            session: RecognitionSession::default(),
            current: None,
            sample_rate,
        }
    }

    pub fn session(&self) -> RecognitionSession {
        self.session
    }

    pub fn scene(&self) -> &Arc<CompiledScene> {
        &self.scene
    }

    pub fn active_page(&self) -> Option<&ComicPage> {
        self.session
            .active_page_index
            .and_then(|i| self.scene.page_for_target(i))
    }

    pub fn is_narration_playing(&self) -> bool {
        self.session.is_narration_playing
    }

    pub fn current_playback(&self) -> Option<PlaybackId> {
        self.current
    }

    pub fn on_target_found(&mut self, target_index: usize) {
        let Some(page) = self.scene.page_for_target(target_index) else {
            tracing::warn!(
                target_index,
                pages = self.scene.pages.len(),
                "found target out of range; ignored"
            );
            return;
        };
        let has_narration = page.has_narration();
        let has_video = page.has_video();

        tracing::debug!(target_index, page = %page.id, "target found");
        self.session.active_page_index = Some(target_index);

        if has_narration
            && should_restart_narration(target_index, self.session.previous_active_index)
        {
            self.play_narration(target_index);
        }
        if has_video {
            self.video.restart(target_index);
        }
        self.session.previous_active_index = Some(target_index);
    }

    /// Pauses video content only. The page stays active and narration keeps playing.
    pub fn on_target_lost(&mut self, target_index: usize) {
        let Some(page) = self.scene.page_for_target(target_index) else {
            tracing::warn!(target_index, "lost target out of range; ignored");
            return;
        };
        if page.has_video() {
            self.video.pause(target_index);
        }
    }

    /// Stop narration if playing, else start the active page's narration. Returns whether
    /// narration is playing afterwards.
    pub fn toggle_narration(&mut self) -> bool {
        if self.session.is_narration_playing {
            self.stop_narration();
        } else if let Some(idx) = self.session.active_page_index {
            if self.scene.page_for_target(idx).is_some_and(ComicPage::has_narration) {
                self.play_narration(idx);
            }
        }
        self.session.is_narration_playing
    }

    /// Stop the current playback. Stopping when nothing plays is a no-op.
    pub fn stop_narration(&mut self) {
        if let Some(id) = self.current.take() {
            if let Err(e) = self.audio.stop(id) {
                tracing::warn!(playback = id.0, error = %e, "failed to stop narration");
            }
        }
        self.session.is_narration_playing = false;
    }

    /// Natural end of playback `id`. Ignored unless `id` is the current playback.
    pub fn on_playback_ended(&mut self, id: PlaybackId) {
        if self.current == Some(id) {
            self.current = None;
            self.session.is_narration_playing = false;
            tracing::debug!(playback = id.0, "narration ended");
        }
    }

    /// Drain natural-end notifications from the audio output.
    pub fn pump_audio(&mut self) {
        while let Some(id) = self.audio.poll_finished() {
            self.on_playback_ended(id);
        }
    }

    /// Stop narration and close the audio context. Idempotent.
    pub fn release_audio(&mut self) {
        self.stop_narration();
        self.audio_ctx.close(self.audio.as_mut());
    }

    /// Bind to a new scene: fresh recognition state and a fresh audio context slot.
    pub fn rebind(&mut self, scene: Arc<CompiledScene>) {
        self.release_audio();
        self.scene = scene;
        self.session = RecognitionSession::default();
        self.audio_ctx.reset();
    }

    fn play_narration(&mut self, page_index: usize) {
        // The old reference is stopped before anything else can fail.
        self.stop_narration();
        if let Err(e) = self.start_playback(page_index) {
            tracing::warn!(page_index, error = %e, "narration playback failed");
        }
    }

    fn start_playback(&mut self, page_index: usize) -> PanelResult<()> {
        let Some(encoded) = self
            .scene
            .page_for_target(page_index)
            .and_then(|p| p.narration_audio_source.as_deref())
        else {
            return Ok(());
        };
        let clip = pcm::decode_narration(encoded, self.sample_rate)?;
        self.audio_ctx
            .ensure_open(self.audio.as_mut(), self.sample_rate)?;
        let id = self.audio.start(&clip)?;
        self.current = Some(id);
        self.session.is_narration_playing = true;
        Ok(())
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("scene", &self.scene.id)
            .field("session", &self.session)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/controller.rs"]
mod tests;
