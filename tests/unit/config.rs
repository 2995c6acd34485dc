use super::*;

#[test]
fn missing_fields_take_defaults() {
    let cfg = PanelConfig::from_reader(r#"{"session": {"loaded_grace_period_ms": 500}}"#.as_bytes())
        .unwrap();
    assert_eq!(cfg.session.loaded_grace_period(), Duration::from_millis(500));
    assert_eq!(cfg.session.narration_sample_rate, 24_000);
    assert_eq!(cfg.compile, CompileOpts::default());
}

#[test]
fn empty_object_is_the_default_config() {
    let cfg = PanelConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, PanelConfig::default());
    assert_eq!(cfg.session.loaded_grace_period(), Duration::from_secs(3));
}

#[test]
fn invalid_values_are_rejected() {
    let err = PanelConfig::from_reader(r#"{"compile": {"descriptor_side": 1}}"#.as_bytes())
        .unwrap_err();
    assert!(err.to_string().contains("descriptor_side"));
    assert!(PanelConfig::from_reader("[".as_bytes()).is_err());
}

#[test]
fn oversized_descriptor_side_is_rejected() {
    for side in [CompileOpts::MAX_DESCRIPTOR_SIDE + 1, u32::MAX] {
        let json = format!(r#"{{"compile": {{"descriptor_side": {side}}}}}"#);
        let err = PanelConfig::from_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, PanelError::Validation(ref m) if m.contains("descriptor_side")));
    }

    let json = format!(
        r#"{{"compile": {{"descriptor_side": {}}}}}"#,
        CompileOpts::MAX_DESCRIPTOR_SIDE
    );
    let cfg = PanelConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.compile.descriptor_side, 256);
}
