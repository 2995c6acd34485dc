use super::*;
use crate::lifecycle::HandleRegistry;
use crate::runtime::graph::SceneGraph;

fn empty_graph(n: usize) -> SceneGraph {
    SceneGraph {
        assets: Vec::new(),
        entities: (0..n)
            .map(|i| crate::runtime::graph::TrackingEntity {
                id: crate::runtime::graph::entity_id(i),
                target_index: i,
                child: None,
            })
            .collect(),
    }
}

#[test]
fn events_without_listeners_are_dropped() {
    let mut reg = HandleRegistry::default();
    let handle = reg.create(vec![1]);
    let mut engine = ScriptedEngine::new();
    let probe = engine.probe();

    engine.start(&handle, &empty_graph(2)).unwrap();
    probe.push_all([EngineEvent::TargetFound(0), EngineEvent::Loaded]);
    assert_eq!(engine.poll_event(), Some(EngineEvent::Loaded));
    assert!(engine.has_loaded());
    assert_eq!(probe.dropped_events(), vec![EngineEvent::TargetFound(0)]);

    let sub = engine.subscribe(1).unwrap();
    probe.push(EngineEvent::TargetFound(1));
    assert_eq!(engine.poll_event(), Some(EngineEvent::TargetFound(1)));

    engine.unsubscribe(&sub);
    probe.push(EngineEvent::TargetLost(1));
    assert_eq!(engine.poll_event(), None);
    assert!(probe.live_subscriptions().is_empty());
}

#[test]
fn stopped_engine_delivers_nothing() {
    let mut reg = HandleRegistry::default();
    let handle = reg.create(vec![1]);
    let mut engine = ScriptedEngine::new();
    let probe = engine.probe();
    engine.start(&handle, &empty_graph(1)).unwrap();
    engine.stop();
    probe.push(EngineEvent::Loaded);
    assert_eq!(engine.poll_event(), None);
    assert!(engine.subscribe(0).is_err());
    assert_eq!(probe.stop_count(), 1);
}

#[test]
fn target_check_rejects_foreign_artifacts() {
    let mut reg = HandleRegistry::default();
    let handle = reg.create(b"not an artifact".to_vec());
    let mut engine = ScriptedEngine::new().checking_targets();
    let err = engine.start(&handle, &empty_graph(1)).unwrap_err();
    assert!(matches!(err, PanelError::ArtifactDecode(_)));
}
