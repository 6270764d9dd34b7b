use crate::foundation::core::{Fps, FrameRgba};
use crate::foundation::error::{ReelError, ReelResult};

/// Length of the whole composition: the primary audio plus fixed padding.
pub fn compute_target_duration(primary_audio_sec: f64, padding_sec: f64) -> ReelResult<f64> {
    if !primary_audio_sec.is_finite() || primary_audio_sec <= 0.0 {
        return Err(ReelError::invalid_asset(format!(
            "primary audio duration must be > 0, got {primary_audio_sec}"
        )));
    }
    if !padding_sec.is_finite() || padding_sec < 0.0 {
        return Err(ReelError::validation("duration padding must be >= 0"));
    }
    Ok(primary_audio_sec + padding_sec)
}

/// How the background visual is matched to the target duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundFit {
    /// Restart from the first frame until the target is covered, then cut.
    Loop { copies: u64 },
    /// The visual is long enough; cut at the target.
    Trim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundSchedule {
    pub target_frames: u64,
    pub fit: BackgroundFit,
}

/// Decide loop vs trim for a visual of `visual_sec` (unknown durations are treated as long enough;
/// [`LoopingFrames`] still restarts on an early end of stream).
pub fn schedule_background(
    visual_sec: Option<f64>,
    target_sec: f64,
    fps: Fps,
) -> ReelResult<BackgroundSchedule> {
    let target_frames = fps.secs_to_frames_round(target_sec);
    if target_frames == 0 {
        return Err(ReelError::validation(format!(
            "target duration {target_sec}s is shorter than one frame"
        )));
    }
    let fit = match visual_sec {
        Some(v) if v <= 0.0 || !v.is_finite() => {
            return Err(ReelError::invalid_asset(
                "background visual has zero duration",
            ));
        }
        Some(v) if v < target_sec => BackgroundFit::Loop {
            copies: (target_sec / v).ceil() as u64,
        },
        _ => BackgroundFit::Trim,
    };
    Ok(BackgroundSchedule { target_frames, fit })
}

/// Sequential producer of canvas-sized background frames.
pub trait FrameSource {
    /// Fill `frame` with the next frame. Returns `false` at end of stream.
    fn read_frame(&mut self, frame: &mut FrameRgba) -> ReelResult<bool>;
    /// Seek back to the first frame.
    fn restart(&mut self) -> ReelResult<()>;
}

/// Wraps a [`FrameSource`] so it yields exactly `target_frames` frames, looping at end of stream.
pub struct LoopingFrames<S> {
    source: S,
    remaining: u64,
    since_restart: u64,
    restarts: u64,
}

impl<S: FrameSource> LoopingFrames<S> {
    pub fn new(source: S, target_frames: u64) -> Self {
        Self {
            source,
            remaining: target_frames,
            since_restart: 0,
            restarts: 0,
        }
    }

    /// Number of times the source was rewound so far.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn next_frame(&mut self, frame: &mut FrameRgba) -> ReelResult<bool> {
        if self.remaining == 0 {
            return Ok(false);
        }
        if !self.source.read_frame(frame)? {
            if self.since_restart == 0 {
                return Err(ReelError::invalid_asset(
                    "background visual produced no frames",
                ));
            }
            self.source.restart()?;
            self.restarts += 1;
            self.since_restart = 0;
            tracing::debug!(restarts = self.restarts, "looping background");
            if !self.source.read_frame(frame)? {
                return Err(ReelError::invalid_asset(
                    "background visual produced no frames after restart",
                ));
            }
        }
        self.since_restart += 1;
        self.remaining -= 1;
        Ok(true)
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/sync.rs"]
mod tests;
