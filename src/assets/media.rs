use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::audio::pcm::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::config::ToolPaths;
use crate::foundation::core::{Canvas, Fps, FrameRgba};
use crate::foundation::error::{ReelError, ReelResult};
use crate::timing::sync::FrameSource;
use crate::transform::fit::FitCrop;

/// Metadata of an audio or visual source file.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaAsset {
    pub path: PathBuf,
    /// Container duration in seconds (absent for stills).
    pub duration_sec: Option<f64>,
    /// First video stream size.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// First audio stream layout.
    pub channels: Option<u16>,
    pub sample_rate: Option<u32>,
}

impl MediaAsset {
    /// Video size, or [`ReelError::InvalidAsset`] when there is no video stream.
    pub fn dimensions(&self) -> ReelResult<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
            _ => Err(ReelError::invalid_asset(format!(
                "'{}' has no usable video stream",
                self.path.display()
            ))),
        }
    }
}

/// Probe a media file through `ffprobe`.
#[tracing::instrument(skip(tools))]
pub fn probe_media(tools: &ToolPaths, path: &Path) -> ReelResult<MediaAsset> {
    if !path.is_file() {
        return Err(ReelError::missing_asset("media", path));
    }

    let out = Command::new(&tools.ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| ReelError::invalid_asset(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::invalid_asset(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(path, &out.stdout)
}

pub(crate) fn parse_probe_json(path: &Path, json: &[u8]) -> ReelResult<MediaAsset> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        channels: Option<u16>,
        sample_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ReelError::invalid_asset(format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));
    if video.is_none() && audio.is_none() {
        return Err(ReelError::invalid_asset(format!(
            "'{}' has no audio or video stream",
            path.display()
        )));
    }

    let parse_secs = |s: &Option<String>| {
        s.as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite())
    };
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| parse_secs(&f.duration))
        .or_else(|| video.or(audio).and_then(|s| parse_secs(&s.duration)));

    Ok(MediaAsset {
        path: path.to_path_buf(),
        duration_sec,
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        channels: audio.and_then(|s| s.channels),
        sample_rate: audio
            .and_then(|s| s.sample_rate.as_deref())
            .and_then(|r| r.parse().ok()),
    })
}

/// Decode the first audio stream to interleaved stereo `f32` PCM at [`MIX_SAMPLE_RATE`].
///
/// ffmpeg does the resampling and the up/downmix, so the result is ready for the mixer.
#[tracing::instrument(skip_all, fields(path = %asset.path.display()))]
pub fn decode_audio(tools: &ToolPaths, asset: &MediaAsset) -> ReelResult<AudioPcm> {
    match (asset.channels, asset.sample_rate) {
        (Some(ch), Some(rate)) if ch > 0 && rate > 0 => {}
        (Some(_), Some(_)) => {
            return Err(ReelError::invalid_asset(format!(
                "'{}' reports an empty audio layout",
                asset.path.display()
            )));
        }
        _ => {
            return Err(ReelError::invalid_asset(format!(
                "'{}' has no audio stream",
                asset.path.display()
            )));
        }
    }

    let out = Command::new(&tools.ffmpeg)
        .args(audio_decode_args(&asset.path))
        .output()
        .map_err(|e| ReelError::invalid_asset(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::invalid_asset(format!(
            "ffmpeg audio decode failed for '{}': {}",
            asset.path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let pcm = AudioPcm::from_f32le_bytes(&out.stdout, MIX_SAMPLE_RATE, MIX_CHANNELS)?;
    if pcm.frames() == 0 {
        return Err(ReelError::invalid_asset(format!(
            "'{}' decoded to zero audio samples",
            asset.path.display()
        )));
    }
    tracing::debug!(frames = pcm.frames(), "decoded audio");
    Ok(pcm)
}

pub(crate) fn audio_decode_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(path.as_os_str().to_owned());
    args.extend(
        [
            "-vn".to_owned(),
            "-f".to_owned(),
            "f32le".to_owned(),
            "-acodec".to_owned(),
            "pcm_f32le".to_owned(),
            "-ac".to_owned(),
            MIX_CHANNELS.to_string(),
            "-ar".to_owned(),
            MIX_SAMPLE_RATE.to_string(),
            "pipe:1".to_owned(),
        ]
        .map(OsString::from),
    );
    args
}

struct DecoderProcess {
    child: Child,
    stdout: ChildStdout,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl DecoderProcess {
    /// Reap the process after end of stream and report a non-zero exit.
    fn finish(mut self, path: &Path) -> ReelResult<()> {
        let status = self
            .child
            .wait()
            .map_err(|e| ReelError::invalid_asset(format!("wait for ffmpeg decoder: {e}")))?;
        let stderr = self
            .stderr_drain
            .take()
            .and_then(|h| h.join().ok())
            .and_then(Result::ok)
            .unwrap_or_default();
        if !status.success() {
            return Err(ReelError::invalid_asset(format!(
                "ffmpeg video decode failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for DecoderProcess {
    fn drop(&mut self) {
        // No-op once the child has been reaped.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Streams canvas-sized RGBA frames out of a video file.
///
/// The fit-and-crop plan and the output frame rate are applied inside the ffmpeg decoder, so
/// every frame arrives already transformed. The child process is killed on drop.
pub struct VideoFrameReader {
    ffmpeg: PathBuf,
    path: PathBuf,
    filter: String,
    canvas: Canvas,
    process: Option<DecoderProcess>,
}

impl VideoFrameReader {
    pub fn open(
        tools: &ToolPaths,
        path: &Path,
        crop: &FitCrop,
        fps: Fps,
    ) -> ReelResult<Self> {
        let canvas = Canvas::new(crop.width, crop.height)?;
        let mut reader = Self {
            ffmpeg: tools.ffmpeg.clone(),
            path: path.to_path_buf(),
            filter: format!("fps={}/{},{}", fps.num, fps.den, crop.ffmpeg_filter()),
            canvas,
            process: None,
        };
        reader.spawn()?;
        Ok(reader)
    }

    fn spawn(&mut self) -> ReelResult<()> {
        let mut child = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(&self.path)
            .args([
                "-an",
                "-sn",
                "-vf",
                &self.filter,
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReelError::invalid_asset(format!("failed to spawn ffmpeg decoder: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::invalid_asset("failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::invalid_asset("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.process = Some(DecoderProcess {
            child,
            stdout,
            stderr_drain: Some(stderr_drain),
        });
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }
}

impl FrameSource for VideoFrameReader {
    fn read_frame(&mut self, frame: &mut FrameRgba) -> ReelResult<bool> {
        if frame.width != self.canvas.width || frame.height != self.canvas.height {
            return Err(ReelError::validation(format!(
                "frame buffer is {}x{}, decoder produces {}x{}",
                frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        let Some(process) = self.process.as_mut() else {
            return Ok(false);
        };

        let n = read_full(&mut process.stdout, &mut frame.data).map_err(|e| {
            ReelError::invalid_asset(format!("read frame from '{}': {e}", self.path.display()))
        })?;
        if n == frame.data.len() {
            return Ok(true);
        }

        // End of stream; a trailing partial frame is dropped.
        if let Some(process) = self.process.take() {
            process.finish(&self.path)?;
        }
        Ok(false)
    }

    fn restart(&mut self) -> ReelResult<()> {
        self.process = None;
        self.spawn()
    }
}

fn read_full(r: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
