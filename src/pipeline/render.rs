use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;

use crate::assets::decode::decode_image_file;
use crate::assets::inputs::require_all;
use crate::assets::media::{VideoFrameReader, decode_audio, probe_media};
use crate::audio::mix::{AudioMixSpec, MixedTrack, mix, prepare_voice_only};
use crate::audio::pcm::{MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::compose::compositor::Compositor;
use crate::compose::plan::{CompositionPlan, PlanBuilder, TextRole};
use crate::config::RenderConfig;
use crate::encode::artifact::OutputArtifact;
use crate::encode::ffmpeg::{EncoderOpts, FfmpegEncoder};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::encode::still::write_png;
use crate::foundation::core::{Fps, FrameIndex, FrameRgba};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::style::{LayerStyle, TextLayerStyle};
use crate::layout::text::FontFace;
use crate::pipeline::request::{ImageRequest, VideoRequest, non_blank};
use crate::retention::sweep::{RetentionPolicy, RetentionReport, enforce_retention};
use crate::timing::sync::{
    BackgroundSchedule, FrameSource, LoopingFrames, compute_target_duration, schedule_background,
};
use crate::transform::fit::plan_fit_crop;

/// Result of a successful render.
#[derive(Debug)]
pub struct RenderOutcome {
    pub artifact: OutputArtifact,
    /// Target duration (0 for stills).
    pub duration_sec: f64,
    pub frames: u64,
    /// `None` when the post-render retention pass could not run.
    pub retention: Option<RetentionReport>,
}

/// Runs renders with one fixed configuration.
///
/// Stages run strictly in order (inputs, audio, duration, geometry and layout, encode,
/// retention) and any error aborts the remaining stages. Retention only runs after the
/// artifact is published, and its failures never fail the render.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: RenderConfig,
    video_style: LayerStyle,
    image_style: LayerStyle,
}

impl Pipeline {
    pub fn new(config: RenderConfig) -> ReelResult<Self> {
        config.validate()?;
        let profile = config.profile;
        Ok(Self {
            config,
            video_style: LayerStyle::video().scaled(profile),
            image_style: LayerStyle::image().scaled(profile),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Destination for a bare output file name inside the output directory.
    pub fn output_path(&self, name: &str) -> ReelResult<PathBuf> {
        let bare = Path::new(name)
            .file_name()
            .is_some_and(|f| f == std::ffi::OsStr::new(name));
        if name.is_empty() || !bare || name == ".." {
            return Err(ReelError::validation(format!(
                "output name {name:?} must be a bare file name"
            )));
        }
        Ok(self.config.output_dir.join(name))
    }

    /// Decode and combine the voice with the optional music bed.
    #[tracing::instrument(skip(self))]
    pub fn mix_audio(&self, affirmation: &Path, music: Option<&Path>) -> ReelResult<MixedTrack> {
        let tools = &self.config.tools;
        let voice_asset = probe_media(tools, affirmation)?;
        let voice = decode_audio(tools, &voice_asset)?;

        match music {
            Some(music) => {
                let music_asset = probe_media(tools, music)?;
                let music = decode_audio(tools, &music_asset)?;
                mix(&voice, &music, &AudioMixSpec::from_config(&self.config.audio))
            }
            None => prepare_voice_only(
                &voice,
                self.config.audio.voice_only_padding_sec,
                self.config.audio.voice_fade_sec,
            ),
        }
    }

    #[tracing::instrument(skip(self, req), fields(out = %req.output_name))]
    pub fn render_video(&self, req: &VideoRequest) -> ReelResult<RenderOutcome> {
        let out_path = self.output_path(&req.output_name)?;
        let tools = &self.config.tools;

        let mut inputs = vec![
            ("affirmation", req.affirmation.as_path()),
            ("background", req.background.as_path()),
            ("logo", req.logo.as_path()),
            ("font", req.font.as_path()),
        ];
        if let Some(music) = req.music.as_deref() {
            inputs.push(("music", music));
        }
        require_all(inputs)?;

        let track = self.mix_audio(&req.affirmation, req.music.as_deref())?;

        let padding = if req.music.is_some() {
            self.config.audio.lead_in_sec + self.config.audio.lead_out_sec
        } else {
            self.config.audio.voice_only_padding_sec
        };
        let target_sec = compute_target_duration(track.voice_duration_sec, padding)?;
        let fps = self.config.fps()?;

        let background = probe_media(tools, &req.background)?;
        let schedule = schedule_background(background.duration_sec, target_sec, fps)?;
        let (src_w, src_h) = background.dimensions()?;
        let canvas = self.config.canvas();
        let crop = plan_fit_crop(src_w, src_h, canvas, self.config.crop_horizontal_bias)?;
        tracing::info!(
            target_sec,
            frames = schedule.target_frames,
            fit = ?schedule.fit,
            "duration synchronized"
        );

        let scratch = tempfile::tempdir().context("create render scratch dir")?;
        let pcm_path = scratch.path().join("mix.f32le");
        track.pcm.write_f32le(&pcm_path)?;

        let builder = CompositionPlan::builder(canvas, target_sec, &out_path).audio(&pcm_path);
        let builder = add_overlays(
            builder,
            &self.video_style,
            &req.header,
            req.subtitle.as_deref(),
            &req.body,
            Some(&req.author),
        );
        let plan = builder.build()?;
        let compositor = self.load_compositor(&plan, &req.font, &req.logo)?;

        let reader = VideoFrameReader::open(tools, &req.background, &crop, fps)?;
        let mut encoder = FfmpegEncoder::new(EncoderOpts::new(
            tools,
            &self.config.encode,
            &plan.output_path,
        ));
        let sink_cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            audio: Some(AudioInputConfig {
                path: pcm_path,
                sample_rate: MIX_SAMPLE_RATE,
                channels: MIX_CHANNELS,
            }),
        };
        let frames = render_frames(reader, &schedule, &compositor, &mut encoder, sink_cfg)?;
        let artifact = encoder
            .into_artifact()
            .ok_or_else(|| ReelError::encoding("encoder finished without an artifact"))?;
        drop(scratch);

        Ok(RenderOutcome {
            artifact,
            duration_sec: target_sec,
            frames,
            retention: self.retention_after_success(),
        })
    }

    #[tracing::instrument(skip(self, req), fields(out = %req.output_name))]
    pub fn render_image(&self, req: &ImageRequest) -> ReelResult<RenderOutcome> {
        let out_path = self.output_path(&req.output_name)?;
        require_all([
            ("background", req.background.as_path()),
            ("logo", req.logo.as_path()),
            ("font", req.font.as_path()),
        ])?;

        let source = decode_image_file("background", &req.background)?;
        let canvas = self.config.canvas();
        let crop = plan_fit_crop(
            source.width,
            source.height,
            canvas,
            self.config.crop_horizontal_bias,
        )?;
        let mut frame = crop.apply_to_frame(&source)?;

        let builder = CompositionPlan::builder(canvas, 0.0, &out_path);
        let builder = add_overlays(
            builder,
            &self.image_style,
            &req.header,
            req.subtitle.as_deref(),
            &req.body,
            None,
        );
        let plan = builder.build()?;
        let compositor = self.load_compositor(&plan, &req.font, &req.logo)?;
        compositor.compose_in_place(&mut frame)?;

        let artifact = write_png(&frame, &plan.output_path)?;
        Ok(RenderOutcome {
            artifact,
            duration_sec: 0.0,
            frames: 1,
            retention: self.retention_after_success(),
        })
    }

    /// Run the retention pass over the output directory now.
    pub fn sweep(&self) -> ReelResult<RetentionReport> {
        let policy = RetentionPolicy::from_config(&self.config.output_dir, &self.config.retention);
        enforce_retention(&policy, SystemTime::now())
    }

    fn retention_after_success(&self) -> Option<RetentionReport> {
        match self.sweep() {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(error = %e, "retention pass failed");
                None
            }
        }
    }

    fn load_compositor(
        &self,
        plan: &CompositionPlan,
        font: &Path,
        logo: &Path,
    ) -> ReelResult<Compositor> {
        let font = FontFace::load(font)?;
        let logo = decode_image_file("logo", logo)?;
        Compositor::from_plan(plan, &font, &logo)
    }
}

fn add_overlays(
    builder: PlanBuilder,
    style: &LayerStyle,
    header: &str,
    subtitle: Option<&str>,
    body: &str,
    author: Option<&str>,
) -> PlanBuilder {
    fn text(b: PlanBuilder, role: TextRole, s: &TextLayerStyle, content: &str) -> PlanBuilder {
        b.text(
            role,
            format!("{}{content}", s.prefix),
            s.text.clone(),
            s.anchor,
        )
    }

    let mut b = builder.logo(style.logo.diameter, style.logo.anchor);
    if let Some(h) = non_blank(Some(header)) {
        b = text(b, TextRole::Header, &style.header, h);
    }
    if let Some(s) = non_blank(subtitle) {
        b = text(b, TextRole::Subtitle, &style.subtitle, s);
    }
    if let Some(t) = non_blank(Some(body)) {
        b = text(b, TextRole::Body, &style.body, t);
    }
    if let (Some(a), Some(s)) = (non_blank(author), style.author.as_ref()) {
        b = text(b, TextRole::Author, s, a);
    }
    b
}

/// Pull exactly `schedule.target_frames` background frames, composite and push them to `sink`.
pub fn render_frames<S: FrameSource, K: FrameSink>(
    source: S,
    schedule: &BackgroundSchedule,
    compositor: &Compositor,
    sink: &mut K,
    cfg: SinkConfig,
) -> ReelResult<u64> {
    let canvas = compositor.canvas();
    if cfg.width != canvas.width || cfg.height != canvas.height {
        return Err(ReelError::geometry("sink size differs from the canvas"));
    }
    let fps: Fps = cfg.fps;

    let mut frames = LoopingFrames::new(source, schedule.target_frames);
    let mut frame = FrameRgba::transparent(canvas.width, canvas.height);
    sink.begin(cfg)?;
    let mut idx = 0u64;
    while frames.next_frame(&mut frame)? {
        compositor.compose_in_place(&mut frame)?;
        sink.push_frame(FrameIndex(idx), &frame)?;
        idx += 1;
    }
    sink.end()?;

    tracing::debug!(
        frames = idx,
        secs = fps.frames_to_secs(idx),
        restarts = frames.restarts(),
        "frames encoded"
    );
    Ok(idx)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/render.rs"]
mod tests;
