use super::*;

#[test]
fn artifact_round_trip_is_bit_exact() {
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4099).collect();
    let text = encode_artifact(&bytes);
    assert!(text.starts_with("data:application/octet-stream;base64,"));
    assert_eq!(decode_text(&text).unwrap(), bytes);
}

#[test]
fn empty_buffer_round_trips() {
    let text = encode_artifact(&[]);
    assert_eq!(text, "data:application/octet-stream;base64,");
    assert!(decode_text(&text).unwrap().is_empty());
}

#[test]
fn large_buffer_round_trips() {
    let mut state = 0x1234_5678u32;
    let bytes: Vec<u8> = (0..(1024 * 1024 + 17))
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state & 0xff) as u8
        })
        .collect();
    let text = encode_artifact(&bytes);
    assert_eq!(decode_text(&text).unwrap(), bytes);
}

#[test]
fn bare_base64_decodes_without_prefix() {
    assert_eq!(decode_text("AAEC").unwrap(), vec![0u8, 1, 2]);
    assert_eq!(decode_text("  AAEC\n").unwrap(), vec![0u8, 1, 2]);
}

#[test]
fn prefix_is_stripped_for_any_mime() {
    assert_eq!(strip_scheme_prefix("data:audio/pcm;base64,AAEC"), "AAEC");
    assert_eq!(strip_scheme_prefix("data:,AAEC"), "AAEC");
    assert_eq!(strip_scheme_prefix("AAEC"), "AAEC");
}

#[test]
fn corrupt_payload_is_an_artifact_decode_failure() {
    let err = decode_text("data:application/octet-stream;base64,@@@").unwrap_err();
    assert!(matches!(err, PanelError::ArtifactDecode(_)));
}

#[test]
fn mime_and_description() {
    assert_eq!(data_uri_mime("data:image/png;base64,AA=="), Some("image/png"));
    assert_eq!(data_uri_mime("pages/p1.png"), None);
    assert_eq!(describe_source("pages/p1.png"), "pages/p1.png");
    assert!(describe_source("data:image/png;base64,AA==").starts_with("data:image/png ("));
}
