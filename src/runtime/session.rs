use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    audio::output::AudioOutput,
    config::SessionOpts,
    foundation::error::{PanelError, PanelResult},
    lifecycle::ResourceScope,
    overlay::{
        controller::{OverlayController, RecognitionSession},
        video::VideoControl,
    },
    runtime::{
        engine::{EngineEvent, RecognitionEngine, Subscription},
        graph::SceneGraph,
    },
    scene::model::{ComicPage, CompiledScene},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeState {
    Uninitialized,
    /// Artifact decoded and handed to the engine; waiting for the scene graph to load.
    Preparing,
    /// Listeners attached; recognition events drive the overlay.
    Ready,
    /// Fatal to the session. Carries the message shown to the user.
    Error(String),
    TornDown,
}

/// One recognition session over one [`CompiledScene`].
///
/// The runtime owns its engine, overlay controller and resources explicitly. Every exit path
/// (teardown, drop, scene replacement) goes through the same release sequence, and once teardown
/// has begun no late event can mutate state.
pub struct RecognitionRuntime {
    state: RuntimeState,
    engine: Box<dyn RecognitionEngine>,
    engine_started: bool,
    overlay: OverlayController,
    resources: ResourceScope,
    graph: Option<SceneGraph>,
    subscriptions: Vec<Subscription>,
    opts: SessionOpts,
    mounted_at: Option<Instant>,
    torn_down: bool,
}

impl RecognitionRuntime {
    pub fn new(
        scene: impl Into<Arc<CompiledScene>>,
        engine: Box<dyn RecognitionEngine>,
        audio: Box<dyn AudioOutput>,
        video: Box<dyn VideoControl>,
        opts: SessionOpts,
    ) -> Self {
        let overlay =
            OverlayController::new(scene.into(), audio, video, opts.narration_sample_rate);
        Self {
            state: RuntimeState::Uninitialized,
            engine,
            engine_started: false,
            overlay,
            resources: ResourceScope::new(),
            graph: None,
            subscriptions: Vec::new(),
            opts,
            mounted_at: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn scene(&self) -> &Arc<CompiledScene> {
        self.overlay.scene()
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.graph.as_ref()
    }

    pub fn resources(&self) -> &ResourceScope {
        &self.resources
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn session(&self) -> RecognitionSession {
        self.overlay.session()
    }

    pub fn active_page(&self) -> Option<&ComicPage> {
        self.overlay.active_page()
    }

    pub fn is_narration_playing(&self) -> bool {
        self.overlay.is_narration_playing()
    }

    /// Text for the status overlay; empty once the session is live.
    pub fn status_message(&self) -> String {
        match &self.state {
            RuntimeState::Uninitialized => "Initializing AR...".to_string(),
            RuntimeState::Preparing => "Building Scene...".to_string(),
            RuntimeState::Error(msg) => msg.clone(),
            RuntimeState::Ready | RuntimeState::TornDown => String::new(),
        }
    }

    /// Decode the artifact, build the scene graph and start the engine.
    ///
    /// On failure the runtime moves to [`RuntimeState::Error`] and the cause is also returned.
    #[tracing::instrument(skip(self), fields(scene = %self.overlay.scene().id))]
    pub fn mount(&mut self) -> PanelResult<()> {
        if self.torn_down {
            return Err(PanelError::engine("cannot mount a torn down session"));
        }
        if self.state != RuntimeState::Uninitialized {
            return Err(PanelError::engine("session is already mounted"));
        }
        self.state = RuntimeState::Preparing;
        self.mounted_at = Some(Instant::now());

        let scene = self.overlay.scene().clone();
        let bytes = match scene.decode_artifact() {
            Ok(bytes) => bytes,
            Err(e) => {
                let msg = if scene.compiled_target_artifact.is_none() {
                    "Error: No compiled target found."
                } else {
                    "Error: Invalid Target File"
                };
                return Err(self.fail(msg.to_string(), e));
            }
        };

        let handle = self.resources.replace_artifact_handle(bytes);
        let graph = SceneGraph::build(&scene);
        if let Err(e) = self.engine.start(&handle, &graph) {
            return Err(self.fail(format!("Error initializing AR: {e}"), e));
        }
        self.engine_started = true;
        self.graph = Some(graph);
        tracing::info!(targets = scene.pages.len(), uri = handle.uri(), "building scene");
        Ok(())
    }

    fn fail(&mut self, message: String, cause: PanelError) -> PanelError {
        tracing::warn!(error = %cause, "{message}");
        self.state = RuntimeState::Error(message);
        cause
    }

    /// Handle one engine event to completion.
    pub fn dispatch(&mut self, event: EngineEvent) {
        if self.torn_down {
            tracing::debug!(?event, "event after teardown ignored");
            return;
        }
        match event {
            EngineEvent::Loaded | EngineEvent::ArReady => {
                if self.state == RuntimeState::Preparing {
                    self.become_ready();
                }
            }
            EngineEvent::ArError(detail) => {
                if matches!(self.state, RuntimeState::Preparing | RuntimeState::Ready) {
                    let detail = if detail.trim().is_empty() {
                        "Check permissions".to_string()
                    } else {
                        detail
                    };
                    self.overlay.stop_narration();
                    self.state = RuntimeState::Error(format!("Camera Error: {detail}"));
                    tracing::warn!(%detail, "engine reported an error");
                }
            }
            EngineEvent::TargetFound(i) => {
                if self.accepts_target(i) {
                    self.overlay.on_target_found(i);
                }
            }
            EngineEvent::TargetLost(i) => {
                if self.accepts_target(i) {
                    self.overlay.on_target_lost(i);
                }
            }
        }
    }

    fn accepts_target(&self, target_index: usize) -> bool {
        if self.state != RuntimeState::Ready {
            return false;
        }
        if target_index >= self.overlay.scene().pages.len() {
            tracing::warn!(target_index, "target index out of range; ignored");
            return false;
        }
        self.subscriptions
            .iter()
            .any(|s| s.target_index == target_index)
    }

    fn become_ready(&mut self) {
        let targets = self.graph.as_ref().map_or(0, SceneGraph::target_count);
        for idx in 0..targets {
            match self.engine.subscribe(idx) {
                Ok(sub) => self.subscriptions.push(sub),
                Err(e) => {
                    tracing::warn!(target_index = idx, error = %e, "failed to attach listeners")
                }
            }
        }
        self.state = RuntimeState::Ready;
        tracing::info!(listeners = self.subscriptions.len(), "scene loaded");
    }

    /// Deliver every pending engine event and audio completion.
    pub fn pump(&mut self) {
        while !self.torn_down {
            let Some(event) = self.engine.poll_event() else {
                break;
            };
            self.dispatch(event);
        }
        if !self.torn_down {
            self.overlay.pump_audio();
        }
    }

    /// Treat the engine as loaded if the grace period elapsed without a `Loaded` event but the
    /// engine reports its graph loaded anyway. Returns whether the session became ready.
    pub fn check_loaded_fallback(&mut self, now: Instant) -> bool {
        if self.torn_down || self.state != RuntimeState::Preparing {
            return false;
        }
        let elapsed = self
            .mounted_at
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        if elapsed < self.opts.loaded_grace_period() || !self.engine.has_loaded() {
            return false;
        }
        tracing::debug!(?elapsed, "no loaded event; engine reports loaded");
        self.become_ready();
        true
    }

    pub fn toggle_narration(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.overlay.toggle_narration()
    }

    /// Run the release sequence. Safe in any state; the second call is a no-op.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;

        self.overlay.stop_narration();
        if self.engine_started {
            self.engine.stop();
            self.engine_started = false;
        }
        for sub in self.subscriptions.drain(..) {
            self.engine.unsubscribe(&sub);
        }
        self.graph = None;
        self.resources.release();
        self.overlay.release_audio();

        self.state = RuntimeState::TornDown;
        tracing::info!(scene = %self.overlay.scene().id, "session torn down");
        true
    }

    /// Tear down the current session and mount `scene` in its place.
    pub fn replace_scene(&mut self, scene: impl Into<Arc<CompiledScene>>) -> PanelResult<()> {
        self.teardown();
        self.overlay.rebind(scene.into());
        self.state = RuntimeState::Uninitialized;
        self.mounted_at = None;
        self.torn_down = false;
        self.mount()
    }
}

impl Drop for RecognitionRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for RecognitionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionRuntime")
            .field("state", &self.state)
            .field("overlay", &self.overlay)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/session.rs"]
mod tests;
