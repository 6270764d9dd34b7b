use crate::compose::composite::{blit_over, over_in_place};
use crate::compose::plan::{CompositionPlan, LayerKind};
use crate::foundation::core::{Canvas, FrameRgba};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::logo::circular_logo;
use crate::layout::text::{FontFace, render_text_fitted};

/// A rasterized overlay layer with its resolved top-left position.
#[derive(Clone, Debug)]
pub struct PlacedSprite {
    pub z: u8,
    pub image: FrameRgba,
    pub x: u32,
    pub y: u32,
}

/// Rasterize every overlay of `plan` and resolve its anchor against the measured size.
///
/// Text that would not fit inside the canvas less a 5% margin on each side is set smaller.
#[tracing::instrument(skip_all, fields(layers = plan.layers.len()))]
pub fn rasterize_overlays(
    plan: &CompositionPlan,
    font: &FontFace,
    logo: &FrameRgba,
) -> ReelResult<Vec<PlacedSprite>> {
    let margin = plan.canvas.width / 20;
    let max_w = plan.canvas.width.saturating_sub(2 * margin).max(1);
    let max_h = plan.canvas.height.saturating_sub(2 * margin).max(1);
    let mut out = Vec::new();
    for layer in plan.overlays() {
        let image = match &layer.kind {
            LayerKind::Background => continue,
            LayerKind::CircularLogo { diameter } => circular_logo(logo, *diameter)?,
            LayerKind::Text { content, style, .. } => {
                render_text_fitted(font, content, style, max_w, max_h)?
            }
        };
        let (x, y) = layer
            .anchor
            .resolve(image.width, image.height, plan.canvas)?;
        tracing::debug!(
            z = layer.z,
            x,
            y,
            w = image.width,
            h = image.height,
            "placed layer"
        );
        out.push(PlacedSprite {
            z: layer.z,
            image,
            x,
            y,
        });
    }
    Ok(out)
}

/// Composites the static overlay stack onto background frames.
///
/// Overlays span the whole duration, so they are flattened once into a single premultiplied
/// layer and each frame costs one `over` pass.
pub struct Compositor {
    canvas: Canvas,
    overlay: FrameRgba,
}

impl Compositor {
    pub fn new(canvas: Canvas, sprites: &[PlacedSprite]) -> ReelResult<Self> {
        let mut ordered: Vec<&PlacedSprite> = sprites.iter().collect();
        ordered.sort_by_key(|s| s.z);

        let mut overlay = FrameRgba::transparent(canvas.width, canvas.height);
        for sprite in ordered {
            if sprite.x + sprite.image.width > canvas.width
                || sprite.y + sprite.image.height > canvas.height
            {
                return Err(ReelError::geometry(format!(
                    "layer z={} at ({}, {}) overflows the canvas",
                    sprite.z, sprite.x, sprite.y
                )));
            }
            blit_over(&mut overlay, &sprite.image, sprite.x, sprite.y);
        }
        Ok(Self { canvas, overlay })
    }

    pub fn from_plan(plan: &CompositionPlan, font: &FontFace, logo: &FrameRgba) -> ReelResult<Self> {
        let sprites = rasterize_overlays(plan, font, logo)?;
        Self::new(plan.canvas, &sprites)
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Draw the overlay stack over a canvas-sized background frame.
    pub fn compose_in_place(&self, frame: &mut FrameRgba) -> ReelResult<()> {
        if frame.width != self.canvas.width || frame.height != self.canvas.height {
            return Err(ReelError::geometry(format!(
                "background frame is {}x{}, canvas is {}x{}",
                frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        over_in_place(&mut frame.data, &self.overlay.data)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
