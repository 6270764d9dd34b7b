use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math;

/// Sample rate every track is normalized to before mixing.
pub const MIX_SAMPLE_RATE: u32 = 44_100;

/// Channel count every track is normalized to before mixing.
pub const MIX_CHANNELS: u16 = 2;

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Silent buffer of `frames` sample frames.
    pub fn silence(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved_f32: vec![0.0; frames * usize::from(channels)],
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Sample-frame count closest to `secs` at this buffer's rate.
    pub fn secs_to_frames(&self, secs: f64) -> usize {
        (secs * f64::from(self.sample_rate)).round().max(0.0) as usize
    }

    /// Bring a track decoded at [`MIX_SAMPLE_RATE`] to the stereo mix layout.
    ///
    /// Mono is duplicated to both channels. Rate conversion happens in the decoder, so any other
    /// rate, or more than two channels, is rejected.
    pub fn to_mix_layout(&self) -> ReelResult<Self> {
        if self.sample_rate != MIX_SAMPLE_RATE {
            return Err(ReelError::invalid_asset(format!(
                "audio is {} Hz, the mix runs at {MIX_SAMPLE_RATE} Hz",
                self.sample_rate
            )));
        }
        match self.channels {
            2 => Ok(self.clone()),
            1 => {
                let mut out = Vec::with_capacity(self.interleaved_f32.len() * 2);
                for &s in &self.interleaved_f32 {
                    out.push(s);
                    out.push(s);
                }
                Ok(Self {
                    sample_rate: self.sample_rate,
                    channels: MIX_CHANNELS,
                    interleaved_f32: out,
                })
            }
            n => Err(ReelError::invalid_asset(format!(
                "unsupported channel count {n} (expected mono or stereo)"
            ))),
        }
    }

    /// Repeat whole copies until at least `frames` long, then cut to exactly `frames`.
    ///
    /// Returns the tiled buffer and how many copies were concatenated (1 when only truncated).
    pub fn tile_to_frames(&self, frames: usize) -> ReelResult<(Self, usize)> {
        let have = self.frames();
        if have == 0 {
            return Err(ReelError::invalid_asset("cannot tile an empty audio buffer"));
        }
        let ch = usize::from(self.channels);
        let copies = if have >= frames { 1 } else { frames.div_ceil(have) };

        let mut out = Vec::with_capacity(have * copies * ch);
        for _ in 0..copies {
            out.extend_from_slice(&self.interleaved_f32);
        }
        out.truncate(frames * ch);

        Ok((
            Self {
                sample_rate: self.sample_rate,
                channels: self.channels,
                interleaved_f32: out,
            },
            copies,
        ))
    }

    pub fn rms(&self) -> f64 {
        math::rms(&self.interleaved_f32)
    }

    pub fn apply_gain(&mut self, gain: f64) {
        let g = gain as f32;
        for s in &mut self.interleaved_f32 {
            *s *= g;
        }
    }

    /// Linear fade-in from the first frame and fade-out to the last frame.
    pub fn apply_fades(&mut self, fade_in_sec: f64, fade_out_sec: f64) {
        let ch = usize::from(self.channels);
        let frames = self.frames();
        let fade_in = self.secs_to_frames(fade_in_sec).min(frames);
        let fade_out = self.secs_to_frames(fade_out_sec).min(frames);

        for i in 0..fade_in {
            let g = i as f32 / fade_in as f32;
            for s in &mut self.interleaved_f32[i * ch..(i + 1) * ch] {
                *s *= g;
            }
        }
        for k in 0..fade_out {
            // k counts back from the last frame, which ends at gain 0
            let i = frames - 1 - k;
            let g = k as f32 / fade_out as f32;
            for s in &mut self.interleaved_f32[i * ch..(i + 1) * ch] {
                *s *= g;
            }
        }
    }

    /// Add `other` into this buffer starting at `offset_frames`, ignoring anything past the end.
    pub fn overlay_at(&mut self, other: &Self, offset_frames: usize) -> ReelResult<()> {
        if other.channels != self.channels || other.sample_rate != self.sample_rate {
            return Err(ReelError::invalid_asset(format!(
                "cannot overlay {}ch@{}Hz onto {}ch@{}Hz",
                other.channels, other.sample_rate, self.channels, self.sample_rate
            )));
        }
        let ch = usize::from(self.channels);
        let start = offset_frames * ch;
        if start >= self.interleaved_f32.len() {
            return Ok(());
        }
        for (d, s) in self.interleaved_f32[start..]
            .iter_mut()
            .zip(other.interleaved_f32.iter())
        {
            *d += *s;
        }
        Ok(())
    }

    pub fn clamp(&mut self) {
        for s in &mut self.interleaved_f32 {
            *s = s.clamp(-1.0, 1.0);
        }
    }

    /// Write interleaved samples to a raw little-endian `.f32le` file.
    pub fn write_f32le(&self, out_path: &Path) -> ReelResult<()> {
        let mut bytes = Vec::<u8>::with_capacity(self.interleaved_f32.len() * 4);
        for &sample in &self.interleaved_f32 {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        std::fs::write(out_path, bytes)
            .with_context(|| format!("write raw pcm '{}'", out_path.display()))?;
        Ok(())
    }

    /// Parse raw little-endian `f32` bytes.
    pub fn from_f32le_bytes(bytes: &[u8], sample_rate: u32, channels: u16) -> ReelResult<Self> {
        if !bytes.len().is_multiple_of(4) {
            return Err(ReelError::invalid_asset(
                "decoded audio byte length is not aligned to f32 samples",
            ));
        }
        let interleaved_f32 = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self {
            sample_rate,
            channels,
            interleaved_f32,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;
