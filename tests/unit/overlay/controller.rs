use super::*;
use crate::assets::transport;
use crate::audio::output::{AudioEvent, AudioLog, RecordingAudioOutput};
use crate::overlay::video::{RecordingVideoControl, VideoEvent, VideoLog};
use crate::scene::model::{ContentKind, OverlayContent};

fn narration(samples: usize) -> String {
    transport::encode_data_uri("audio/pcm", &vec![0u8; samples * 2])
}

fn page(page_number: u32, audio: Option<String>, content: Option<OverlayContent>) -> ComicPage {
    ComicPage {
        id: format!("page-{page_number}"),
        page_number,
        target_image_source: format!("{page_number}.png"),
        content,
        narration_audio_source: audio,
        ai_analysis: None,
    }
}

fn scene(pages: Vec<ComicPage>) -> Arc<CompiledScene> {
    Arc::new(CompiledScene {
        id: "scene".to_string(),
        name: "scene".to_string(),
        description: String::new(),
        compiled_target_artifact: Some(transport::encode_artifact(&[1])),
        pages,
    })
}

fn controller(scene: Arc<CompiledScene>) -> (OverlayController, AudioLog, VideoLog) {
    let audio = RecordingAudioOutput::new();
    let video = RecordingVideoControl::new();
    let (alog, vlog) = (audio.log(), video.log());
    let c = OverlayController::new(scene, Box::new(audio), Box::new(video), 24_000);
    (c, alog, vlog)
}

fn starts(log: &AudioLog) -> Vec<usize> {
    log.events()
        .into_iter()
        .filter_map(|e| match e {
            AudioEvent::Started { samples, .. } => Some(samples),
            _ => None,
        })
        .collect()
}

fn three_narrated_pages() -> Arc<CompiledScene> {
    scene(vec![
        page(1, Some(narration(10)), None),
        page(2, Some(narration(20)), None),
        page(3, Some(narration(30)), None),
    ])
}

#[test]
fn restart_rule_is_a_pure_comparison() {
    assert!(should_restart_narration(0, None));
    assert!(!should_restart_narration(0, Some(0)));
    assert!(should_restart_narration(1, Some(0)));
}

#[test]
fn refinding_the_same_target_does_not_restart_narration() {
    let (mut c, log, _) = controller(three_narrated_pages());
    c.on_target_found(0);
    c.on_target_found(0);
    c.on_target_lost(0);
    c.on_target_found(0);
    assert_eq!(starts(&log), vec![10]);
    assert!(c.is_narration_playing());
}

#[test]
fn switching_away_and_back_restarts_narration() {
    let (mut c, log, _) = controller(three_narrated_pages());
    c.on_target_found(0);
    c.on_target_found(1);
    c.on_target_found(0);
    assert_eq!(starts(&log), vec![10, 20, 10]);
}

#[test]
fn at_most_one_playback_is_live() {
    let (mut c, log, _) = controller(three_narrated_pages());
    c.on_target_found(0);
    let first = c.current_playback().unwrap();
    c.on_target_found(1);
    let second = c.current_playback().unwrap();

    assert_ne!(first, second);
    assert_eq!(log.live_playbacks(), vec![second]);
    assert!(log.events().contains(&AudioEvent::Stopped { id: first }));
    assert_eq!(log.count(|e| matches!(e, AudioEvent::Opened { .. })), 1);
}

#[test]
fn target_index_maps_to_position_not_page_number() {
    let s = scene(vec![
        page(1, None, None),
        page(5, Some(narration(55)), Some(OverlayContent::new(ContentKind::Video, "v.mp4"))),
        page(2, Some(narration(22)), None),
    ]);
    let (mut c, log, vlog) = controller(s);
    c.on_target_found(1);
    assert_eq!(c.active_page().unwrap().page_number, 5);
    assert_eq!(starts(&log), vec![55]);
    assert_eq!(vlog.events(), vec![VideoEvent::Restarted(1)]);
}

#[test]
fn lost_target_pauses_video_but_keeps_narration() {
    let s = scene(vec![page(
        1,
        Some(narration(8)),
        Some(OverlayContent::new(ContentKind::Video, "v.mp4")),
    )]);
    let (mut c, _, vlog) = controller(s);
    c.on_target_found(0);
    c.on_target_lost(0);
    assert_eq!(
        vlog.events(),
        vec![VideoEvent::Restarted(0), VideoEvent::Paused(0)]
    );
    assert!(c.is_narration_playing());
    assert_eq!(c.session().active_page_index, Some(0));

    c.on_target_found(0);
    assert_eq!(vlog.restarts(0), 2);
}

#[test]
fn out_of_range_targets_are_ignored() {
    let (mut c, log, _) = controller(three_narrated_pages());
    c.on_target_found(3);
    c.on_target_lost(99);
    assert_eq!(c.session(), RecognitionSession::default());
    assert!(log.events().is_empty());
}

#[test]
fn contentless_pages_activate_without_media() {
    let (mut c, log, vlog) = controller(scene(vec![page(1, None, None)]));
    c.on_target_found(0);
    assert_eq!(c.session().active_page_index, Some(0));
    assert!(log.events().is_empty());
    assert!(vlog.events().is_empty());
}

#[test]
fn toggle_stops_then_restarts_active_narration() {
    let (mut c, log, _) = controller(three_narrated_pages());
    assert!(!c.toggle_narration());
    c.on_target_found(2);
    assert!(!c.toggle_narration());
    assert!(c.toggle_narration());
    assert_eq!(starts(&log), vec![30, 30]);
}

#[test]
fn stop_is_idempotent_and_natural_end_clears_flag() {
    let (mut c, log, _) = controller(three_narrated_pages());
    c.stop_narration();
    c.on_target_found(0);
    let id = c.current_playback().unwrap();

    c.on_playback_ended(PlaybackId(id.0 + 100));
    assert!(c.is_narration_playing());

    log.finish(id);
    c.pump_audio();
    assert!(!c.is_narration_playing());
    assert!(c.current_playback().is_none());

    c.stop_narration();
    c.stop_narration();
    assert_eq!(log.count(|e| matches!(e, AudioEvent::Stopped { .. })), 0);
}

#[test]
fn bad_narration_payload_is_swallowed() {
    let (mut c, log, _) = controller(scene(vec![page(1, Some("%%%".to_string()), None)]));
    c.on_target_found(0);
    assert!(!c.is_narration_playing());
    assert_eq!(c.session().previous_active_index, Some(0));
    assert!(log.events().is_empty());
}

#[test]
fn release_closes_audio_once_and_blocks_new_playback() {
    let (mut c, log, _) = controller(three_narrated_pages());
    c.on_target_found(0);
    c.release_audio();
    c.release_audio();
    assert_eq!(log.count(|e| matches!(e, AudioEvent::Closed)), 1);
    assert!(log.live_playbacks().is_empty());

    c.on_target_found(1);
    assert!(!c.is_narration_playing());
    assert_eq!(log.count(|e| matches!(e, AudioEvent::Opened { .. })), 1);
}
