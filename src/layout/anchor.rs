use serde::{Deserialize, Serialize};

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// Placement rule along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisAnchor {
    /// Top/left edge at this pixel offset.
    Offset(f64),
    /// Centered on the canvas.
    Center,
}

/// Where a layer's measured box goes on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: AxisAnchor,
    pub y: AxisAnchor,
}

impl Anchor {
    pub const fn absolute(x: f64, y: f64) -> Self {
        Self {
            x: AxisAnchor::Offset(x),
            y: AxisAnchor::Offset(y),
        }
    }

    pub const fn center() -> Self {
        Self {
            x: AxisAnchor::Center,
            y: AxisAnchor::Center,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        let s = |a: AxisAnchor| match a {
            AxisAnchor::Offset(v) => AxisAnchor::Offset(v * factor),
            AxisAnchor::Center => AxisAnchor::Center,
        };
        Self {
            x: s(self.x),
            y: s(self.y),
        }
    }

    /// Top-left pixel of a `width` x `height` box on `canvas`.
    ///
    /// The box is shifted back inside the canvas when an offset would push it past an edge.
    pub fn resolve(self, width: u32, height: u32, canvas: Canvas) -> ReelResult<(u32, u32)> {
        if width > canvas.width || height > canvas.height {
            return Err(ReelError::geometry(format!(
                "layer box {width}x{height} does not fit the {}x{} canvas",
                canvas.width, canvas.height
            )));
        }
        let x = resolve_axis(self.x, width, canvas.width);
        let y = resolve_axis(self.y, height, canvas.height);
        Ok((x, y))
    }
}

fn resolve_axis(anchor: AxisAnchor, size: u32, extent: u32) -> u32 {
    let max = extent - size;
    match anchor {
        AxisAnchor::Center => max / 2,
        AxisAnchor::Offset(v) => {
            let v = if v.is_finite() { v.round() } else { 0.0 };
            let clamped = v.clamp(0.0, f64::from(max)) as u32;
            if clamped as f64 != v {
                tracing::debug!(requested = v, placed = clamped, "layer clamped into canvas");
            }
            clamped
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/anchor.rs"]
mod tests;
