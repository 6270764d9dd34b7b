use std::path::Path;

use anyhow::bail;

pub const MAX_HEADER: usize = 100;
pub const MAX_BODY: usize = 500;
pub const MAX_AUTHOR: usize = 50;
pub const MAX_SUBTITLE: usize = 100;

/// Reject empty or over-long text before any rendering starts.
pub fn check_text(field: &str, value: &str, max_chars: usize) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        bail!("{field} must not be empty");
    }
    let n = value.chars().count();
    if n > max_chars {
        bail!("{field} is {n} characters, limit is {max_chars}");
    }
    Ok(())
}

pub fn check_optional_text(field: &str, value: Option<&str>, max_chars: usize) -> anyhow::Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => check_text(field, v, max_chars),
        _ => Ok(()),
    }
}

/// Voice and music uploads are `.mp3` or `.wav`.
pub fn check_audio_ext(field: &str, path: &Path) -> anyhow::Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp3" | "wav") => Ok(()),
        _ => bail!("{field} '{}' must be an .mp3 or .wav file", path.display()),
    }
}

pub fn video_output_name(unix_secs: u64, audio: &Path) -> String {
    let stem = audio
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    format!("processed_{unix_secs}_{stem}.mp4")
}

pub fn image_output_name(unix_secs: u64) -> String {
    format!("processed{unix_secs}image.png")
}

#[cfg(test)]
#[path = "../tests/unit/request.rs"]
mod tests;
