use super::*;
use crate::audio::output::{AudioEvent, RecordingAudioOutput};

#[test]
fn replacing_a_handle_revokes_the_old_one() {
    let mut scope = ResourceScope::new();
    let a = scope.replace_artifact_handle(vec![1]);
    let b = scope.replace_artifact_handle(vec![2]);
    assert_ne!(a.uri(), b.uri());
    assert!(scope.registry().resolve(a.uri()).is_none());
    assert_eq!(scope.registry().resolve(b.uri()).unwrap().as_slice(), &[2]);
    assert_eq!(scope.registry().revoked_count(), 1);
}

#[test]
fn release_is_idempotent() {
    let mut scope = ResourceScope::new();
    let h = scope.replace_artifact_handle(vec![1, 2, 3]);
    assert!(h.uri().starts_with("blob:panelcast/"));
    assert!(scope.release());
    assert!(!scope.release());
    assert_eq!(scope.registry().revoked_count(), 1);
    assert_eq!(scope.registry().live_count(), 0);
    assert!(scope.artifact_handle().is_none());
}

#[test]
fn revoke_twice_is_a_noop() {
    let mut reg = HandleRegistry::default();
    let h = reg.create(vec![0]);
    assert!(reg.revoke(&h));
    assert!(!reg.revoke(&h));
    assert_eq!(reg.created_count(), 1);
    assert_eq!(reg.revoked_count(), 1);
}

#[test]
fn audio_slot_opens_once_and_closes_once() {
    let mut out = RecordingAudioOutput::new();
    let log = out.log();
    let mut slot = AudioContextSlot::default();

    slot.ensure_open(&mut out, 24_000).unwrap();
    slot.ensure_open(&mut out, 24_000).unwrap();
    assert_eq!(slot.open_count(), 1);

    slot.close(&mut out);
    slot.close(&mut out);
    assert_eq!(slot.close_count(), 1);
    assert!(slot.ensure_open(&mut out, 24_000).is_err());
    assert_eq!(log.count(|e| matches!(e, AudioEvent::Closed)), 1);
}

#[test]
fn unopened_slot_closes_without_touching_output() {
    let mut out = RecordingAudioOutput::new();
    let log = out.log();
    let mut slot = AudioContextSlot::default();
    slot.close(&mut out);
    assert!(log.events().is_empty());
    assert_eq!(slot.close_count(), 0);
}
