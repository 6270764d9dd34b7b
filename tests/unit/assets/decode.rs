use super::*;

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decoded_png_is_premultiplied() {
    let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([200, 100, 0, 128]));
    let frame = decode_image(&png_bytes(&img)).unwrap();
    assert_eq!((frame.width, frame.height), (2, 1));
    assert_eq!(frame.pixel(1, 0), [100, 50, 0, 128]);
}

#[test]
fn garbage_is_an_invalid_asset() {
    assert!(matches!(
        decode_image(b"not an image"),
        Err(ReelError::InvalidAsset(_))
    ));
}

#[test]
fn file_errors_name_the_role() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("logo.png");
    std::fs::write(&bad, b"nope").unwrap();
    let msg = decode_image_file("logo", &bad).unwrap_err().to_string();
    assert!(msg.contains("logo"), "{msg}");
    assert!(matches!(
        decode_image_file("logo", &dir.path().join("missing.png")),
        Err(ReelError::MissingAsset { .. })
    ));
}
