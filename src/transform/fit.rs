use crate::foundation::core::{Canvas, FrameRgba};
use crate::foundation::error::{ReelError, ReelResult};

/// Resize-then-crop plan mapping a source frame onto the canvas without distortion.
///
/// The source is scaled so its height equals the canvas height, then a canvas-wide window is
/// cut out horizontally. Vertical offset is always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitCrop {
    pub resized_width: u32,
    pub resized_height: u32,
    /// Left edge of the crop window inside the resized frame.
    pub crop_x: u32,
    pub width: u32,
    pub height: u32,
}

/// Plan the fit-and-crop of a `src_width` x `src_height` source onto `canvas`.
///
/// `horizontal_bias` places the crop center at that fraction of the resized width
/// (0.5 is a centered crop); the window is then clamped inside the frame.
pub fn plan_fit_crop(
    src_width: u32,
    src_height: u32,
    canvas: Canvas,
    horizontal_bias: f64,
) -> ReelResult<FitCrop> {
    if src_width == 0 || src_height == 0 {
        return Err(ReelError::invalid_asset(
            "background has zero width or height",
        ));
    }
    if !(0.0..=1.0).contains(&horizontal_bias) {
        return Err(ReelError::validation(
            "horizontal crop bias must be within [0, 1]",
        ));
    }

    let resized_height = canvas.height;
    let resized_width = (f64::from(src_width) * f64::from(canvas.height) / f64::from(src_height))
        .round() as u32;
    if resized_width < canvas.width {
        return Err(ReelError::geometry(format!(
            "background {src_width}x{src_height} is narrower than the {}x{} canvas aspect; \
             filling it would need upscaling past the height or distortion",
            canvas.width, canvas.height
        )));
    }

    let max_x = resized_width - canvas.width;
    let center = f64::from(resized_width) * horizontal_bias;
    let x = (center - f64::from(canvas.width) / 2.0).floor();
    let crop_x = x.clamp(0.0, f64::from(max_x)) as u32;

    tracing::debug!(
        src_width,
        src_height,
        resized_width,
        crop_x,
        "planned background crop"
    );
    Ok(FitCrop {
        resized_width,
        resized_height,
        crop_x,
        width: canvas.width,
        height: canvas.height,
    })
}

impl FitCrop {
    /// Equivalent ffmpeg filter chain (`scale` then `crop`).
    pub fn ffmpeg_filter(&self) -> String {
        format!(
            "scale={}:{}:flags=lanczos,crop={}:{}:{}:0",
            self.resized_width, self.resized_height, self.width, self.height, self.crop_x
        )
    }

    /// Apply the plan to an in-memory frame (used for stills).
    pub fn apply_to_frame(&self, src: &FrameRgba) -> ReelResult<FrameRgba> {
        let img = image::RgbaImage::from_raw(src.width, src.height, src.data.clone())
            .ok_or_else(|| ReelError::invalid_asset("background buffer does not match its size"))?;
        let resized = image::imageops::resize(
            &img,
            self.resized_width,
            self.resized_height,
            image::imageops::FilterType::Lanczos3,
        );
        let cropped =
            image::imageops::crop_imm(&resized, self.crop_x, 0, self.width, self.height).to_image();
        FrameRgba::from_premul(self.width, self.height, cropped.into_raw())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/fit.rs"]
mod tests;
