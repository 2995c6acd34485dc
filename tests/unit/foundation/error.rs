use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PanelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PanelError::compile("x")
            .to_string()
            .contains("compile failure:")
    );
    assert!(
        PanelError::artifact_decode("x")
            .to_string()
            .contains("artifact decode failure:")
    );
    assert!(PanelError::engine("x").to_string().contains("engine error:"));
    assert!(
        PanelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn load_failure_names_the_source() {
    let err = PanelError::load("pages/p1.png", "unexpected EOF");
    assert_eq!(
        err.to_string(),
        "load failure for 'pages/p1.png': unexpected EOF"
    );
    assert!(err.is_user_actionable());
}

#[test]
fn engine_errors_are_not_user_actionable() {
    assert!(!PanelError::engine("camera denied").is_user_actionable());
    assert!(!PanelError::content_generation("tts").is_user_actionable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PanelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
