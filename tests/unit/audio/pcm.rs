use base64::Engine as _;

use super::*;

#[test]
fn known_samples_decode_exactly() {
    assert_eq!(pcm16le_to_f32(&[0x00, 0x00, 0x00, 0x80]), vec![0.0, -1.0]);
    assert_eq!(pcm16le_to_f32(&[0xff, 0x7f]), vec![32767.0 / 32768.0]);
}

#[test]
fn odd_trailing_byte_is_dropped() {
    assert_eq!(pcm16le_to_f32(&[0x00, 0x40, 0x01]), vec![0.5]);
}

#[test]
fn data_uri_prefix_is_stripped() {
    let payload = base64::engine::general_purpose::STANDARD.encode([0x00u8, 0x00, 0x00, 0x80]);
    let bare = decode_narration(&payload, NARRATION_SAMPLE_RATE).unwrap();
    let prefixed = decode_narration(
        &format!("data:audio/pcm;base64,{payload}"),
        NARRATION_SAMPLE_RATE,
    )
    .unwrap();
    assert_eq!(bare, prefixed);
    assert_eq!(bare.samples.as_slice(), &[0.0, -1.0]);
}

#[test]
fn duration_uses_sample_rate() {
    let bytes = vec![0u8; 2 * 24_000];
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    let clip = decode_narration(&payload, NARRATION_SAMPLE_RATE).unwrap();
    assert!((clip.duration_sec() - 1.0).abs() < 1e-12);
}

#[test]
fn garbage_payload_is_rejected() {
    assert!(decode_narration("!!not base64!!", NARRATION_SAMPLE_RATE).is_err());
    assert!(decode_narration("AAAA", 0).is_err());
}
