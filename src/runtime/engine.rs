use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
    compile::compiler::TargetIndex,
    foundation::error::{PanelError, PanelResult},
    lifecycle::ObjectHandle,
    runtime::graph::SceneGraph,
};

/// Event emitted by a recognition engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// The scene graph finished loading.
    Loaded,
    /// Camera started and tracking is live. Treated like `Loaded` if that never arrived.
    ArReady,
    TargetFound(usize),
    TargetLost(usize),
    /// Camera, permission or engine failure, with the engine's detail text (may be empty).
    ArError(String),
}

/// Target-found/lost listener registration. Returned by [`RecognitionEngine::subscribe`] and
/// handed back on teardown.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    pub target_index: usize,
    pub id: u64,
}

/// Black-box recognition engine, owned by one runtime session.
pub trait RecognitionEngine {
    /// Start tracking the targets in `artifact`, bound to the entities of `graph`.
    fn start(&mut self, artifact: &ObjectHandle, graph: &SceneGraph) -> PanelResult<()>;

    /// Whether the graph has finished loading, whether or not `Loaded` was delivered.
    fn has_loaded(&self) -> bool;

    /// Attach found/lost listeners to the entity for `target_index`.
    fn subscribe(&mut self, target_index: usize) -> PanelResult<Subscription>;

    fn unsubscribe(&mut self, subscription: &Subscription);

    /// Next pending event, if any. Events are delivered one at a time.
    fn poll_event(&mut self) -> Option<EngineEvent>;

    /// Stop the engine's internal systems (camera, tracking loop).
    fn stop(&mut self);
}

#[derive(Debug, Default)]
struct ProbeState {
    queue: VecDeque<EngineEvent>,
    running: bool,
    loaded: bool,
    starts: u32,
    stops: u32,
    started_with: Option<String>,
    next_subscription: u64,
    subscriptions: Vec<Subscription>,
    dropped: Vec<EngineEvent>,
}

/// Shared handle used to script and observe a [`ScriptedEngine`].
#[derive(Clone, Debug, Default)]
pub struct EngineProbe(Rc<RefCell<ProbeState>>);

impl EngineProbe {
    /// Queue an event for delivery. `Loaded` also marks the graph as loaded.
    pub fn push(&self, event: EngineEvent) {
        self.0.borrow_mut().queue.push_back(event);
    }

    pub fn push_all(&self, events: impl IntoIterator<Item = EngineEvent>) {
        self.0.borrow_mut().queue.extend(events);
    }

    /// Mark the graph as loaded without emitting `Loaded`.
    pub fn set_loaded_silently(&self) {
        self.0.borrow_mut().loaded = true;
    }

    pub fn is_running(&self) -> bool {
        self.0.borrow().running
    }

    pub fn start_count(&self) -> u32 {
        self.0.borrow().starts
    }

    pub fn stop_count(&self) -> u32 {
        self.0.borrow().stops
    }

    /// URI of the artifact handle the engine was last started with.
    pub fn started_with(&self) -> Option<String> {
        self.0.borrow().started_with.clone()
    }

    pub fn live_subscriptions(&self) -> Vec<Subscription> {
        self.0.borrow().subscriptions.clone()
    }

    /// Found/lost events that arrived with no listener attached.
    pub fn dropped_events(&self) -> Vec<EngineEvent> {
        self.0.borrow().dropped.clone()
    }
}

/// Engine that replays events queued through its [`EngineProbe`].
///
/// Found/lost events for targets without a live subscription are dropped, as a DOM event fired
/// at an element with no listener would be.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    probe: EngineProbe,
    check_targets: bool,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the artifact on start and require one target per graph entity.
    pub fn checking_targets(mut self) -> Self {
        self.check_targets = true;
        self
    }

    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl RecognitionEngine for ScriptedEngine {
    fn start(&mut self, artifact: &ObjectHandle, graph: &SceneGraph) -> PanelResult<()> {
        if self.check_targets {
            let index = TargetIndex::parse(artifact.bytes())?;
            if index.len() != graph.target_count() {
                return Err(PanelError::engine(format!(
                    "artifact has {} targets but the scene graph has {}",
                    index.len(),
                    graph.target_count()
                )));
            }
        }
        let mut s = self.probe.0.borrow_mut();
        s.running = true;
        s.starts += 1;
        s.started_with = Some(artifact.uri().to_string());
        tracing::debug!(uri = artifact.uri(), targets = graph.target_count(), "engine started");
        Ok(())
    }

    fn has_loaded(&self) -> bool {
        self.probe.0.borrow().loaded
    }

    fn subscribe(&mut self, target_index: usize) -> PanelResult<Subscription> {
        let mut s = self.probe.0.borrow_mut();
        if !s.running {
            return Err(PanelError::engine("engine is not running"));
        }
        s.next_subscription += 1;
        let sub = Subscription {
            target_index,
            id: s.next_subscription,
        };
        s.subscriptions.push(sub.clone());
        Ok(sub)
    }

    fn unsubscribe(&mut self, subscription: &Subscription) {
        self.probe
            .0
            .borrow_mut()
            .subscriptions
            .retain(|s| s != subscription);
    }

    fn poll_event(&mut self) -> Option<EngineEvent> {
        let mut s = self.probe.0.borrow_mut();
        if !s.running {
            return None;
        }
        while let Some(event) = s.queue.pop_front() {
            match event {
                EngineEvent::Loaded => {
                    s.loaded = true;
                    return Some(event);
                }
                EngineEvent::TargetFound(i) | EngineEvent::TargetLost(i)
                    if !s.subscriptions.iter().any(|sub| sub.target_index == i) =>
                {
                    s.dropped.push(event);
                }
                _ => return Some(event),
            }
        }
        None
    }

    fn stop(&mut self) {
        let mut s = self.probe.0.borrow_mut();
        s.running = false;
        s.stops += 1;
        tracing::debug!("engine stopped");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/engine.rs"]
mod tests;
