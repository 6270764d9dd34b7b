use std::path::PathBuf;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::anchor::Anchor;
use crate::layout::text::TextStyle;

/// Text slots of the fixed overlay stack, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextRole {
    Header,
    Subtitle,
    Body,
    Author,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayerKind {
    Background,
    CircularLogo {
        diameter: u32,
    },
    Text {
        role: TextRole,
        content: String,
        style: TextStyle,
    },
}

impl LayerKind {
    /// Position in the fixed stack; background is at the bottom.
    pub fn z(&self) -> u8 {
        match self {
            Self::Background => 0,
            Self::CircularLogo { .. } => 1,
            Self::Text { role, .. } => match role {
                TextRole::Header => 2,
                TextRole::Subtitle => 3,
                TextRole::Body => 4,
                TextRole::Author => 5,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub z: u8,
    pub anchor: Anchor,
    pub duration_sec: f64,
}

/// Immutable parameters of one render.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositionPlan {
    pub canvas: Canvas,
    pub target_duration_sec: f64,
    /// Layers sorted by `z`, background first.
    pub layers: Vec<Layer>,
    /// Mixed audio track (raw `f32le`); `None` for stills.
    pub audio_path: Option<PathBuf>,
    pub output_path: PathBuf,
}

impl CompositionPlan {
    pub fn builder(
        canvas: Canvas,
        target_duration_sec: f64,
        output_path: impl Into<PathBuf>,
    ) -> PlanBuilder {
        PlanBuilder {
            canvas,
            target_duration_sec,
            output_path: output_path.into(),
            audio_path: None,
            layers: Vec::new(),
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !self.target_duration_sec.is_finite() || self.target_duration_sec < 0.0 {
            return Err(ReelError::validation(
                "plan target duration must be finite and >= 0",
            ));
        }
        if self.layers.first().map(|l| &l.kind) != Some(&LayerKind::Background) {
            return Err(ReelError::validation(
                "plan must start with the background layer",
            ));
        }
        for pair in self.layers.windows(2) {
            if pair[0].z >= pair[1].z {
                return Err(ReelError::validation(format!(
                    "layer stack out of order or duplicated at z={}",
                    pair[1].z
                )));
            }
        }
        for layer in &self.layers {
            if layer.z != layer.kind.z() {
                return Err(ReelError::validation("layer z does not match its kind"));
            }
            if layer.duration_sec != self.target_duration_sec {
                return Err(ReelError::validation(format!(
                    "layer z={} lasts {}s, plan lasts {}s",
                    layer.z, layer.duration_sec, self.target_duration_sec
                )));
            }
        }
        Ok(())
    }

    /// Overlay layers (everything above the background), bottom to top.
    pub fn overlays(&self) -> impl Iterator<Item = &Layer> {
        self.layers
            .iter()
            .filter(|l| l.kind != LayerKind::Background)
    }
}

/// Assembles a [`CompositionPlan`]; layers can be added in any order and are kept sorted.
pub struct PlanBuilder {
    canvas: Canvas,
    target_duration_sec: f64,
    output_path: PathBuf,
    audio_path: Option<PathBuf>,
    layers: Vec<(LayerKind, Anchor)>,
}

impl PlanBuilder {
    pub fn audio(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_path = Some(path.into());
        self
    }

    pub fn logo(mut self, diameter: u32, anchor: Anchor) -> Self {
        self.layers
            .push((LayerKind::CircularLogo { diameter }, anchor));
        self
    }

    pub fn text(
        mut self,
        role: TextRole,
        content: impl Into<String>,
        style: TextStyle,
        anchor: Anchor,
    ) -> Self {
        self.layers.push((
            LayerKind::Text {
                role,
                content: content.into(),
                style,
            },
            anchor,
        ));
        self
    }

    pub fn build(self) -> ReelResult<CompositionPlan> {
        let duration = self.target_duration_sec;
        let background = (LayerKind::Background, Anchor::absolute(0.0, 0.0));
        let mut layers: Vec<Layer> = std::iter::once(background)
            .chain(self.layers)
            .map(|(kind, anchor)| Layer {
                z: kind.z(),
                kind,
                anchor,
                duration_sec: duration,
            })
            .collect();
        layers.sort_by_key(|l| l.z);

        let plan = CompositionPlan {
            canvas: self.canvas,
            target_duration_sec: duration,
            layers,
            audio_path: self.audio_path,
            output_path: self.output_path,
        };
        plan.validate()?;
        Ok(plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
