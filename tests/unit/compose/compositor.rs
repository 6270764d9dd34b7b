use super::*;
use crate::compose::plan::TextRole;
use crate::config::CanvasProfile;
use crate::layout::anchor::Anchor;
use crate::layout::style::LayerStyle;

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRgba {
    FrameRgba::from_premul(w, h, px.repeat((w * h) as usize)).unwrap()
}

fn canvas() -> Canvas {
    Canvas {
        width: 8,
        height: 8,
    }
}

#[test]
fn higher_layers_cover_lower_ones() {
    let sprites = vec![
        PlacedSprite {
            z: 4,
            image: solid(2, 2, [0, 0, 255, 255]),
            x: 3,
            y: 3,
        },
        PlacedSprite {
            z: 1,
            image: solid(4, 4, [255, 0, 0, 255]),
            x: 2,
            y: 2,
        },
    ];
    let comp = Compositor::new(canvas(), &sprites).unwrap();
    let mut frame = solid(8, 8, [0, 255, 0, 255]);
    comp.compose_in_place(&mut frame).unwrap();

    assert_eq!(frame.pixel(0, 0), [0, 255, 0, 255]);
    assert_eq!(frame.pixel(2, 2), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(3, 3), [0, 0, 255, 255]);
    assert_eq!(frame.pixel(5, 5), [255, 0, 0, 255]);
    assert_eq!(frame.pixel(6, 6), [0, 255, 0, 255]);
}

#[test]
fn canvas_size_is_preserved_and_enforced() {
    let comp = Compositor::new(canvas(), &[]).unwrap();
    let mut wrong = solid(4, 8, [0, 0, 0, 255]);
    assert!(matches!(
        comp.compose_in_place(&mut wrong),
        Err(ReelError::Geometry(_))
    ));
    let mut frame = solid(8, 8, [1, 2, 3, 255]);
    comp.compose_in_place(&mut frame).unwrap();
    assert_eq!(frame, solid(8, 8, [1, 2, 3, 255]));
}

#[test]
fn overflowing_sprite_is_a_geometry_error() {
    let sprites = [PlacedSprite {
        z: 2,
        image: solid(4, 4, [1, 1, 1, 255]),
        x: 6,
        y: 0,
    }];
    assert!(matches!(
        Compositor::new(canvas(), &sprites),
        Err(ReelError::Geometry(_))
    ));
}

#[test]
fn logo_only_plan_is_placed_at_its_anchor() {
    let plan = CompositionPlan::builder(
        Canvas {
            width: 64,
            height: 64,
        },
        1.0,
        "o.mp4",
    )
    .logo(16, Anchor::absolute(4.0, 8.0))
    .build()
    .unwrap();
    let logo = solid(32, 32, [200, 200, 200, 255]);
    let mut sprites = Vec::new();
    for layer in plan.overlays() {
        if let LayerKind::CircularLogo { diameter } = layer.kind {
            let image = circular_logo(&logo, diameter).unwrap();
            let (x, y) = layer.anchor.resolve(image.width, image.height, plan.canvas).unwrap();
            sprites.push(PlacedSprite { z: layer.z, image, x, y });
        }
    }
    assert_eq!((sprites[0].x, sprites[0].y), (4, 8));

    let comp = Compositor::new(plan.canvas, &sprites).unwrap();
    let mut frame = solid(64, 64, [0, 0, 0, 255]);
    comp.compose_in_place(&mut frame).unwrap();
    assert_eq!(frame.pixel(12, 16), [200, 200, 200, 255]);
    assert_eq!(frame.pixel(4, 8), [0, 0, 0, 255]);
}

fn system_font() -> Option<FontFace> {
    let mut stack = vec![
        std::path::PathBuf::from("/usr/share/fonts"),
        std::path::PathBuf::from("/usr/local/share/fonts"),
    ];
    while let Some(dir) = stack.pop() {
        let Ok(rd) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in rd.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "ttf")
                && let Ok(face) = FontFace::load(&path)
            {
                return Some(face);
            }
        }
    }
    None
}

#[test]
fn longest_allowed_text_fits_both_profiles() {
    let Some(font) = system_font() else {
        eprintln!("no system .ttf font; skipping");
        return;
    };
    let header = "H".repeat(100);
    let subtitle = "Subtitle ".repeat(12)[..100].to_owned();
    let body = format!("{}words", "word ".repeat(99));
    assert_eq!(body.len(), 500);
    let author = format!("- {}", "A".repeat(50));
    let logo = solid(64, 64, [255, 255, 255, 255]);

    for profile in [CanvasProfile::Full, CanvasProfile::Half] {
        let style = LayerStyle::video().scaled(profile);
        let author_style = style.author.clone().unwrap();
        let plan = CompositionPlan::builder(profile.canvas(), 1.0, "o.mp4")
            .logo(style.logo.diameter, style.logo.anchor)
            .text(TextRole::Header, header.clone(), style.header.text.clone(), style.header.anchor)
            .text(
                TextRole::Subtitle,
                subtitle.clone(),
                style.subtitle.text.clone(),
                style.subtitle.anchor,
            )
            .text(TextRole::Body, body.clone(), style.body.text.clone(), style.body.anchor)
            .text(TextRole::Author, author.clone(), author_style.text, author_style.anchor)
            .build()
            .unwrap();

        let sprites = rasterize_overlays(&plan, &font, &logo).unwrap();
        let canvas = profile.canvas();
        for s in &sprites {
            assert!(s.x + s.image.width <= canvas.width, "{profile:?} z={}", s.z);
            assert!(s.y + s.image.height <= canvas.height, "{profile:?} z={}", s.z);
        }
        assert!(Compositor::from_plan(&plan, &font, &logo).is_ok());
    }
}
