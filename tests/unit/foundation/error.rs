use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::invalid_asset("x")
            .to_string()
            .contains("invalid asset:")
    );
    assert!(ReelError::geometry("x").to_string().contains("geometry error:"));
    assert!(ReelError::encoding("x").to_string().contains("encoding error:"));
    assert!(ReelError::cleanup("x").to_string().contains("cleanup error:"));
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn missing_asset_names_role_and_path() {
    let err = ReelError::missing_asset("font", "input/BebasNeue-Regular.ttf");
    let msg = err.to_string();
    assert!(msg.contains("font"));
    assert!(msg.contains("input/BebasNeue-Regular.ttf"));
    assert_eq!(err.stage(), "assets");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.stage(), "io");
}
