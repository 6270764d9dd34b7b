use super::*;

fn opaque(w: u32, h: u32) -> FrameRgba {
    FrameRgba::from_premul(w, h, [255u8, 0, 0, 255].repeat((w * h) as usize)).unwrap()
}

#[test]
fn corners_are_transparent_and_center_is_opaque() {
    let logo = circular_logo(&opaque(300, 200), 144).unwrap();
    assert_eq!((logo.width, logo.height), (144, 144));
    for (x, y) in [(0, 0), (143, 0), (0, 143), (143, 143), (10, 10)] {
        assert_eq!(logo.pixel(x, y)[3], 0, "({x},{y})");
    }
    assert_eq!(logo.pixel(72, 72)[3], 255);
    assert_eq!(logo.pixel(72, 2)[3], 255);
}

#[test]
fn mask_keeps_premultiplied_invariant() {
    let logo = circular_logo(&opaque(64, 64), 33).unwrap();
    for px in logo.data.chunks_exact(4) {
        assert!(px[0] <= px[3]);
    }
}

#[test]
fn zero_diameter_is_rejected() {
    assert!(circular_logo(&opaque(4, 4), 0).is_err());
}
