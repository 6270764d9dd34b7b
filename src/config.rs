//! Render configuration consumed by the pipeline.
//!
//! Everything the core needs from its surroundings (canvas profile, encoder quality, audio
//! padding/fades, retention bounds, external tool paths) is carried explicitly in a
//! [`RenderConfig`] handed to [`crate::Pipeline::new`]. Nothing is read from ambient global state.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// Output canvas profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasProfile {
    /// 1080x1920 vertical.
    #[default]
    Full,
    /// 720x1280 vertical.
    Half,
}

impl CanvasProfile {
    /// Pixel size of the canvas for this profile.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Full => Canvas {
                width: 1080,
                height: 1920,
            },
            Self::Half => Canvas {
                width: 720,
                height: 1280,
            },
        }
    }

    /// Factor applied to layer offsets and sizes authored for the full profile.
    pub fn scale(self) -> f64 {
        match self {
            Self::Full => 1.0,
            Self::Half => 720.0 / 1080.0,
        }
    }
}

/// Audio padding, fade and leveling parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Silence before the voice when mixing with music.
    pub lead_in_sec: f64,
    /// Music tail after the voice ends.
    pub lead_out_sec: f64,
    /// Lead-in used when only the voice track is supplied.
    pub voice_only_padding_sec: f64,
    pub music_fade_in_sec: f64,
    pub music_fade_out_sec: f64,
    /// Short click-guard fade applied to both ends of the voice.
    pub voice_fade_sec: f64,
    /// RMS level the voice is normalized to.
    pub voice_target_rms: f64,
    /// Music RMS relative to the voice target, in dB (negative is quieter).
    pub music_offset_db: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            lead_in_sec: 3.0,
            lead_out_sec: 3.0,
            voice_only_padding_sec: 1.0,
            music_fade_in_sec: 3.0,
            music_fade_out_sec: 3.0,
            voice_fade_sec: 0.1,
            voice_target_rms: 0.1,
            music_offset_db: -12.0,
        }
    }
}

/// Encoder quality knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset name.
    pub preset: String,
    /// AAC bitrate, ffmpeg notation.
    pub audio_bitrate: String,
    /// Encoder worker threads.
    pub threads: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            crf: 28,
            preset: "ultrafast".to_string(),
            audio_bitrate: "128k".to_string(),
            threads: 1,
        }
    }
}

/// Bounded-age, bounded-count cleanup of generated artifacts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub max_age_hours: f64,
    pub min_files_to_keep: usize,
    /// Shell-style file-name glob (`*`, `?`, `[...]`).
    pub pattern: String,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: 24.0,
            min_files_to_keep: 50,
            pattern: "processed*".to_string(),
        }
    }
}

/// Paths of the external media toolchain binaries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl ToolPaths {
    /// Return `true` when the configured `ffmpeg` can be invoked.
    pub fn ffmpeg_available(&self) -> bool {
        tool_runs(&self.ffmpeg)
    }

    /// Return `true` when the configured `ffprobe` can be invoked.
    pub fn ffprobe_available(&self) -> bool {
        tool_runs(&self.ffprobe)
    }
}

fn tool_runs(bin: &Path) -> bool {
    std::process::Command::new(bin)
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Complete configuration surface of the render core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub profile: CanvasProfile,
    pub fps: u32,
    /// Horizontal focus of the background crop, as a fraction of the resized width.
    pub crop_horizontal_bias: f64,
    pub audio: AudioConfig,
    pub encode: EncodeConfig,
    pub retention: RetentionConfig,
    pub tools: ToolPaths,
    pub output_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            profile: CanvasProfile::Full,
            fps: 30,
            crop_horizontal_bias: 0.8,
            audio: AudioConfig::default(),
            encode: EncodeConfig::default(),
            retention: RetentionConfig::default(),
            tools: ToolPaths::default(),
            output_dir: PathBuf::from("processed"),
        }
    }
}

impl RenderConfig {
    /// Load and validate a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .map_err(|e| ReelError::validation(format!("config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn canvas(&self) -> Canvas {
        self.profile.canvas()
    }

    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.fps != 24 && self.fps != 30 {
            return Err(ReelError::validation(format!(
                "fps must be 24 or 30, got {}",
                self.fps
            )));
        }
        if !(0.0..=1.0).contains(&self.crop_horizontal_bias) {
            return Err(ReelError::validation(
                "crop_horizontal_bias must be within [0, 1]",
            ));
        }

        let a = &self.audio;
        for (name, v) in [
            ("lead_in_sec", a.lead_in_sec),
            ("lead_out_sec", a.lead_out_sec),
            ("voice_only_padding_sec", a.voice_only_padding_sec),
            ("music_fade_in_sec", a.music_fade_in_sec),
            ("music_fade_out_sec", a.music_fade_out_sec),
            ("voice_fade_sec", a.voice_fade_sec),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ReelError::validation(format!(
                    "audio.{name} must be finite and >= 0"
                )));
            }
        }
        if !a.voice_target_rms.is_finite() || a.voice_target_rms <= 0.0 || a.voice_target_rms > 1.0
        {
            return Err(ReelError::validation(
                "audio.voice_target_rms must be within (0, 1]",
            ));
        }
        if !a.music_offset_db.is_finite() || a.music_offset_db > 0.0 {
            return Err(ReelError::validation(
                "audio.music_offset_db must be <= 0 so the voice stays dominant",
            ));
        }

        if self.encode.crf > 51 {
            return Err(ReelError::validation("encode.crf must be within 0..=51"));
        }
        if self.encode.threads == 0 {
            return Err(ReelError::validation("encode.threads must be >= 1"));
        }
        if self.encode.preset.trim().is_empty() || self.encode.audio_bitrate.trim().is_empty() {
            return Err(ReelError::validation(
                "encode.preset and encode.audio_bitrate must be non-empty",
            ));
        }

        if !self.retention.max_age_hours.is_finite() || self.retention.max_age_hours < 0.0 {
            return Err(ReelError::validation(
                "retention.max_age_hours must be finite and >= 0",
            ));
        }
        if self.retention.pattern.is_empty() {
            return Err(ReelError::validation("retention.pattern must be non-empty"));
        }
        crate::retention::sweep::file_pattern(&self.retention.pattern)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
