use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        KnitlineError::transform("x")
            .to_string()
            .contains("transform error:")
    );
    assert!(
        KnitlineError::alignment("x")
            .to_string()
            .contains("alignment error:")
    );
    assert!(
        KnitlineError::plugin("x")
            .to_string()
            .contains("plugin error:")
    );
    assert!(
        KnitlineError::transition("x")
            .to_string()
            .contains("invalid transition:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = KnitlineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
