use std::io::Write as _;
use std::path::Path;
use std::process::Command;

use anyhow::Context as _;

use crate::audio::pcm::AudioPcm;
use crate::config::ToolPaths;
use crate::encode::artifact::{OutputArtifact, publish, staging_file};
use crate::encode::ffmpeg::flatten_premul_over_bg;
use crate::foundation::core::FrameRgba;
use crate::foundation::error::{ReelError, ReelResult};

/// Write a composed still as an opaque PNG, atomically.
#[tracing::instrument(skip(frame), fields(w = frame.width, h = frame.height))]
pub fn write_png(frame: &FrameRgba, path: &Path) -> ReelResult<OutputArtifact> {
    let mut flat = vec![0u8; frame.data.len()];
    flatten_premul_over_bg(&mut flat, &frame.data, [0, 0, 0, 255])?;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, flat)
        .ok_or_else(|| ReelError::encoding("still buffer does not match its size"))?;

    let mut staging = staging_file(path)?;
    {
        let mut writer = std::io::BufWriter::new(staging.as_file_mut());
        img.write_to(&mut writer, image::ImageFormat::Png)
            .map_err(|e| ReelError::encoding(format!("encode png: {e}")))?;
        writer
            .flush()
            .map_err(|e| ReelError::encoding(format!("flush png: {e}")))?;
    }

    let artifact = publish(staging, path)?;
    tracing::info!(out = %artifact.path.display(), "image written");
    Ok(artifact)
}

/// Container chosen from the destination extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("mp3") => Ok(Self::Mp3),
            Some("wav") => Ok(Self::Wav),
            _ => Err(ReelError::validation(format!(
                "audio output '{}' must end in .mp3 or .wav",
                path.display()
            ))),
        }
    }

    fn codec_args(self) -> &'static [&'static str] {
        match self {
            Self::Mp3 => &["-c:a", "libmp3lame", "-b:a", "192k", "-ar", "44100", "-f", "mp3"],
            Self::Wav => &["-c:a", "pcm_s16le", "-ar", "44100", "-f", "wav"],
        }
    }
}

/// Encode a mixed track to `.mp3` (192k) or `.wav`, atomically.
#[tracing::instrument(skip(tools, track), fields(secs = track.duration_sec()))]
pub fn export_audio(tools: &ToolPaths, track: &AudioPcm, path: &Path) -> ReelResult<OutputArtifact> {
    let format = AudioFormat::from_path(path)?;
    if track.frames() == 0 {
        return Err(ReelError::invalid_asset("refusing to export an empty track"));
    }

    let scratch = tempfile::tempdir().context("create audio scratch dir")?;
    let raw = scratch.path().join("track.f32le");
    track.write_f32le(&raw)?;

    let staging = staging_file(path)?;
    let out = Command::new(&tools.ffmpeg)
        .args(["-y", "-loglevel", "error", "-f", "f32le", "-ar"])
        .arg(track.sample_rate.to_string())
        .arg("-ac")
        .arg(track.channels.to_string())
        .arg("-i")
        .arg(&raw)
        .args(format.codec_args())
        .arg(staging.path())
        .output()
        .map_err(|e| ReelError::encoding(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::encoding(format!(
            "ffmpeg audio export failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    publish(staging, path)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
