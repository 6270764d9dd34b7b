use super::*;

#[test]
fn missing_inputs_name_the_asset() {
    let dir = tempfile::tempdir().unwrap();
    let logo = dir.path().join("logo.png");
    std::fs::write(&logo, b"x").unwrap();
    let font = dir.path().join("font.ttf");

    require_file("logo", &logo).unwrap();
    let err = require_all([("logo", logo.as_path()), ("font", font.as_path())]).unwrap_err();
    match err {
        ReelError::MissingAsset { what, path } => {
            assert_eq!(what, "font");
            assert_eq!(path, font);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn directories_are_not_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        require_file("background", dir.path()),
        Err(ReelError::MissingAsset { .. })
    ));
}

#[test]
fn read_bytes_maps_not_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_bytes("font", &dir.path().join("gone.ttf")),
        Err(ReelError::MissingAsset { .. })
    ));
}
