use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::config::{EncodeConfig, ToolPaths};
use crate::encode::artifact::{OutputArtifact, publish, staging_file};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRgba};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;

/// Options for [`FfmpegEncoder`].
#[derive(Clone, Debug)]
pub struct EncoderOpts {
    pub ffmpeg: PathBuf,
    pub out_path: PathBuf,
    pub crf: u8,
    pub preset: String,
    pub audio_bitrate: String,
    pub threads: u32,
    /// Straight-alpha color that translucent pixels are flattened onto.
    pub bg_rgba: [u8; 4],
}

impl EncoderOpts {
    pub fn new(tools: &ToolPaths, encode: &EncodeConfig, out_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            out_path: out_path.into(),
            crf: encode.crf,
            preset: encode.preset.clone(),
            audio_bitrate: encode.audio_bitrate.clone(),
            threads: encode.threads,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Full ffmpeg argument list writing to `target`.
    pub(crate) fn args(&self, cfg: &SinkConfig, target: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
        args.push(format!("{}x{}", cfg.width, cfg.height));
        // Input rate goes before `-i` for rawvideo.
        args.extend(["-r".to_owned(), format!("{}/{}", cfg.fps.num, cfg.fps.den)]);
        args.extend(["-i".to_owned(), "pipe:0".to_owned()]);

        if let Some(audio) = cfg.audio.as_ref() {
            args.extend([
                "-f".to_owned(),
                "f32le".to_owned(),
                "-ar".to_owned(),
                audio.sample_rate.to_string(),
                "-ac".to_owned(),
                audio.channels.to_string(),
                "-i".to_owned(),
                audio.path.display().to_string(),
            ]);
        }

        args.extend([
            "-c:v".to_owned(),
            "libx264".to_owned(),
            "-preset".to_owned(),
            self.preset.clone(),
            "-crf".to_owned(),
            self.crf.to_string(),
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
        ]);
        if cfg.audio.is_some() {
            args.extend([
                "-c:a".to_owned(),
                "aac".to_owned(),
                "-b:a".to_owned(),
                self.audio_bitrate.clone(),
                "-shortest".to_owned(),
            ]);
        } else {
            args.push("-an".to_owned());
        }
        args.extend([
            "-threads".to_owned(),
            self.threads.to_string(),
            "-movflags".to_owned(),
            "+faststart".to_owned(),
            "-f".to_owned(),
            "mp4".to_owned(),
            target.display().to_string(),
        ]);
        args
    }
}

struct EncoderProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl Drop for EncoderProcess {
    fn drop(&mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Streams composed frames into a system `ffmpeg` writing H.264/AAC MP4.
///
/// Output goes to a hidden staging file next to the destination and is renamed into place
/// only after ffmpeg exits successfully; on any failure or drop nothing is left behind.
pub struct FfmpegEncoder {
    opts: EncoderOpts,
    staging: Option<tempfile::NamedTempFile>,
    process: Option<EncoderProcess>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    artifact: Option<OutputArtifact>,
}

impl FfmpegEncoder {
    pub fn new(opts: EncoderOpts) -> Self {
        Self {
            opts,
            staging: None,
            process: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            artifact: None,
        }
    }

    /// The published file, available after a successful [`FrameSink::end`].
    pub fn artifact(&self) -> Option<&OutputArtifact> {
        self.artifact.as_ref()
    }

    pub fn into_artifact(self) -> Option<OutputArtifact> {
        self.artifact
    }
}

impl FrameSink for FfmpegEncoder {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation("encoder width/height must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "encoder width/height must be even (required for yuv420p)",
            ));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(ReelError::validation(
                "audio sample_rate/channels must be non-zero",
            ));
        }

        let staging = staging_file(&self.opts.out_path)?;
        let mut child = Command::new(&self.opts.ffmpeg)
            .args(self.opts.args(&cfg, staging.path()))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ReelError::encoding(format!(
                    "failed to spawn ffmpeg '{}': {e}",
                    self.opts.ffmpeg.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encoding("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "ffmpeg encoder started"
        );
        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.staging = Some(staging);
        self.process = Some(EncoderProcess {
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
        });
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.artifact = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encoding("encoder not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(ReelError::encoding("encoder received out-of-order frame"));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let stdin = self
            .process
            .as_mut()
            .and_then(|p| p.stdin.as_mut())
            .ok_or_else(|| ReelError::encoding("encoder is already finalized"))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::encoding(format!("write frame to ffmpeg: {e}")))?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        let mut process = self
            .process
            .take()
            .ok_or_else(|| ReelError::encoding("encoder not started"))?;
        drop(process.stdin.take());

        let status = process
            .child
            .wait()
            .map_err(|e| ReelError::encoding(format!("wait for ffmpeg: {e}")))?;
        let stderr = match process.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encoding("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encoding(format!("read ffmpeg stderr: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            // Dropping the staging file removes the partial output.
            self.staging = None;
            return Err(ReelError::encoding(format!(
                "ffmpeg exited with {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        let staging = self
            .staging
            .take()
            .ok_or_else(|| ReelError::encoding("encoder lost its staging file"))?;
        let artifact = publish(staging, &self.opts.out_path)?;
        tracing::info!(
            out = %artifact.path.display(),
            bytes = artifact.size_bytes,
            "video written"
        );
        self.artifact = Some(artifact);
        Ok(())
    }
}

/// Flatten premultiplied RGBA8 over an opaque background color.
pub(crate) fn flatten_premul_over_bg(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten expects equal-length rgba8 buffers",
        ));
    }
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for i in 0..3 {
            d[i] = (u16::from(s[i]) + mul_div255_u16(bg[i], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
