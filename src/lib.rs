//! Reelforge composes short vertical videos and stills from a voice recording, an optional music
//! bed, a background visual, a logo and a few lines of text.
//!
//! A render runs strictly in stages:
//!
//! - Validate inputs and decode/mix the audio ([`audio`])
//! - Derive the target duration and loop/trim the background ([`timing`])
//! - Resize and crop the background to the canvas ([`transform`])
//! - Rasterize the overlays once and composite every frame ([`layout`], [`compose`])
//! - Encode to H.264/AAC MP4 or write a PNG atomically ([`encode`])
//! - Sweep old artifacts out of the output directory ([`retention`])
//!
//! [`Pipeline`] drives the whole sequence from a [`RenderConfig`].
#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod audio;
pub mod compose;
pub mod config;
pub mod encode;
pub mod layout;
pub mod pipeline;
pub mod retention;
pub mod timing;
pub mod transform;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRgba};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::audio::mix::{AudioMixSpec, MixedTrack};
pub use crate::audio::pcm::AudioPcm;
pub use crate::compose::plan::{CompositionPlan, Layer, LayerKind, TextRole};
pub use crate::config::{
    AudioConfig, CanvasProfile, EncodeConfig, RenderConfig, RetentionConfig, ToolPaths,
};
pub use crate::encode::artifact::OutputArtifact;
pub use crate::encode::ffmpeg::{EncoderOpts, FfmpegEncoder};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::still::{AudioFormat, export_audio};
pub use crate::pipeline::render::{Pipeline, RenderOutcome, render_frames};
pub use crate::pipeline::request::{ImageRequest, VideoRequest};
pub use crate::retention::sweep::{RetentionPolicy, RetentionReport, enforce_retention};
