use super::*;
use crate::foundation::color::Color;

fn canvas() -> Canvas {
    Canvas {
        width: 1080,
        height: 1920,
    }
}

#[test]
fn layers_are_stacked_in_fixed_order_regardless_of_insertion() {
    let plan = CompositionPlan::builder(canvas(), 16.0, "out.mp4")
        .text(
            TextRole::Author,
            "- Me",
            TextStyle::new(50.0, Color::GRAY),
            Anchor::absolute(100.0, 1750.0),
        )
        .text(
            TextRole::Body,
            "I am enough",
            TextStyle::new(90.0, Color::WHITE),
            Anchor::center(),
        )
        .logo(144, Anchor::absolute(40.0, 80.0))
        .text(
            TextRole::Header,
            "Daily",
            TextStyle::new(72.0, Color::WHITE),
            Anchor::absolute(200.0, 90.0),
        )
        .audio("mix.f32le")
        .build()
        .unwrap();

    let zs: Vec<u8> = plan.layers.iter().map(|l| l.z).collect();
    assert_eq!(zs, vec![0, 1, 2, 4, 5]);
    assert_eq!(plan.layers[0].kind, LayerKind::Background);
    assert!(plan.layers.iter().all(|l| l.duration_sec == 16.0));
    assert_eq!(plan.overlays().count(), 4);
    assert_eq!(plan.audio_path, Some(PathBuf::from("mix.f32le")));
}

#[test]
fn duplicate_roles_are_rejected() {
    let style = TextStyle::new(10.0, Color::WHITE);
    let res = CompositionPlan::builder(canvas(), 1.0, "o.mp4")
        .text(TextRole::Body, "a", style.clone(), Anchor::center())
        .text(TextRole::Body, "b", style, Anchor::center())
        .build();
    assert!(matches!(res, Err(ReelError::Validation(_))));
}

#[test]
fn mismatched_layer_duration_fails_validation() {
    let mut plan = CompositionPlan::builder(canvas(), 5.0, "o.mp4")
        .logo(10, Anchor::absolute(0.0, 0.0))
        .build()
        .unwrap();
    plan.layers[1].duration_sec = 4.0;
    assert!(plan.validate().is_err());
}

#[test]
fn stills_have_zero_duration_and_no_audio() {
    let plan = CompositionPlan::builder(canvas(), 0.0, "o.png").build().unwrap();
    assert_eq!(plan.layers.len(), 1);
    assert!(plan.audio_path.is_none());
}
