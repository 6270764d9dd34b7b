use super::*;
use crate::config::CanvasProfile;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::timing::sync::BackgroundFit;

struct Solid {
    len: u32,
    pos: u32,
}

impl FrameSource for Solid {
    fn read_frame(&mut self, frame: &mut FrameRgba) -> ReelResult<bool> {
        if self.pos == self.len {
            return Ok(false);
        }
        for px in frame.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[self.pos as u8, 0, 0, 255]);
        }
        self.pos += 1;
        Ok(true)
    }

    fn restart(&mut self) -> ReelResult<()> {
        self.pos = 0;
        Ok(())
    }
}

fn config_in(dir: &Path) -> RenderConfig {
    RenderConfig {
        profile: CanvasProfile::Half,
        output_dir: dir.join("processed"),
        ..RenderConfig::default()
    }
}

fn system_font() -> Option<PathBuf> {
    let mut stack = vec![PathBuf::from("/usr/share/fonts"), PathBuf::from("/usr/local/share/fonts")];
    while let Some(dir) = stack.pop() {
        let Ok(rd) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in rd.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "ttf")
                && FontFace::load(&path).is_ok()
            {
                return Some(path);
            }
        }
    }
    None
}

fn write_png_file(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
    image::RgbaImage::from_pixel(w, h, image::Rgba(rgba))
        .save(path)
        .unwrap();
}

#[test]
fn output_names_must_be_bare() {
    let dir = tempfile::tempdir().unwrap();
    let p = Pipeline::new(config_in(dir.path())).unwrap();
    assert_eq!(
        p.output_path("processed_1_a.mp4").unwrap(),
        dir.path().join("processed").join("processed_1_a.mp4")
    );
    for bad in ["", "..", "../x.mp4", "a/b.mp4"] {
        assert!(p.output_path(bad).is_err(), "{bad:?}");
    }
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = RenderConfig {
        fps: 60,
        ..RenderConfig::default()
    };
    assert!(matches!(Pipeline::new(cfg), Err(ReelError::Validation(_))));
}

#[test]
fn missing_inputs_fail_before_any_media_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config_in(dir.path());
    cfg.tools.ffprobe = dir.path().join("never-run");
    let p = Pipeline::new(cfg).unwrap();
    let req = VideoRequest {
        affirmation: dir.path().join("voice.mp3"),
        music: None,
        background: dir.path().join("background.mp4"),
        logo: dir.path().join("logo.png"),
        font: dir.path().join("font.ttf"),
        header: "Header".into(),
        body: "Body".into(),
        author: "Author".into(),
        subtitle: None,
        output_name: "processed_1_voice.mp4".into(),
    };
    match p.render_video(&req) {
        Err(ReelError::MissingAsset { what, .. }) => assert_eq!(what, "affirmation"),
        other => panic!("expected MissingAsset, got {other:?}"),
    }
    assert!(!dir.path().join("processed").exists());
}

#[test]
fn short_background_is_looped_to_the_target_frame_count() {
    let canvas = Canvas {
        width: 4,
        height: 4,
    };
    let fps = Fps::new(30, 1).unwrap();
    let schedule = schedule_background(Some(5.0), 16.0, fps).unwrap();
    assert_eq!(schedule.fit, BackgroundFit::Loop { copies: 4 });

    let compositor = Compositor::new(canvas, &[]).unwrap();
    let mut sink = InMemorySink::new();
    let cfg = SinkConfig {
        width: 4,
        height: 4,
        fps,
        audio: None,
    };
    let n = render_frames(Solid { len: 150, pos: 0 }, &schedule, &compositor, &mut sink, cfg)
        .unwrap();

    assert_eq!(n, 480);
    assert!(sink.is_finished());
    let frames = sink.frames();
    assert_eq!(frames.len(), 480);
    assert_eq!(frames[149].1.pixel(0, 0)[0], 149);
    assert_eq!(frames[150].1.pixel(0, 0)[0], 0);
    assert_eq!(frames[479].0, FrameIndex(479));
}

#[test]
fn sink_size_must_match_the_canvas() {
    let compositor = Compositor::new(
        Canvas {
            width: 4,
            height: 4,
        },
        &[],
    )
    .unwrap();
    let schedule = BackgroundSchedule {
        target_frames: 1,
        fit: BackgroundFit::Trim,
    };
    let cfg = SinkConfig {
        width: 8,
        height: 4,
        fps: Fps::new(24, 1).unwrap(),
        audio: None,
    };
    let res = render_frames(
        Solid { len: 1, pos: 0 },
        &schedule,
        &compositor,
        &mut InMemorySink::new(),
        cfg,
    );
    assert!(matches!(res, Err(ReelError::Geometry(_))));
}

#[test]
fn still_image_render_writes_a_canvas_sized_png() {
    let Some(font) = system_font() else {
        eprintln!("skipping: no system .ttf font found");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let background = dir.path().join("bg.png");
    let logo = dir.path().join("logo.png");
    write_png_file(&background, 320, 180, [20, 40, 60, 255]);
    write_png_file(&logo, 64, 64, [250, 250, 250, 255]);

    let p = Pipeline::new(config_in(dir.path())).unwrap();
    let outcome = p
        .render_image(&ImageRequest {
            background,
            logo,
            font,
            header: "Morning".into(),
            body: "I choose calm over chaos today".into(),
            subtitle: Some("Daily affirmation".into()),
            output_name: "processed1700000000image.png".into(),
        })
        .unwrap();

    let img = image::open(&outcome.artifact.path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (720, 1280));
    // Bottom-left corner is plain background.
    let px = img.get_pixel(2, 1277).0;
    for (got, want) in px.iter().zip([20u8, 40, 60, 255]) {
        assert!(got.abs_diff(want) <= 2, "{px:?}");
    }
    let report = outcome.retention.unwrap();
    assert_eq!(report.kept.len(), 1);
    assert!(report.deleted.is_empty());
}
