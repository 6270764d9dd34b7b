use crate::foundation::core::FrameRgba;
use crate::foundation::error::{ReelError, ReelResult};

/// Resize `src` to a `diameter` square and cut it to a circle.
///
/// Pixels outside the circle are fully transparent; the rim gets one pixel of coverage
/// antialiasing.
pub fn circular_logo(src: &FrameRgba, diameter: u32) -> ReelResult<FrameRgba> {
    if diameter == 0 {
        return Err(ReelError::validation("logo diameter must be > 0"));
    }
    let img = image::RgbaImage::from_raw(src.width, src.height, src.data.clone())
        .ok_or_else(|| ReelError::invalid_asset("logo buffer does not match its size"))?;
    let square = image::imageops::resize(
        &img,
        diameter,
        diameter,
        image::imageops::FilterType::Lanczos3,
    );
    let mut out = FrameRgba::from_premul(diameter, diameter, square.into_raw())?;
    apply_circle_mask(&mut out);
    Ok(out)
}

fn apply_circle_mask(frame: &mut FrameRgba) {
    let w = frame.width as usize;
    let r = f64::from(frame.width) / 2.0;
    for (i, px) in frame.data.chunks_exact_mut(4).enumerate() {
        let dx = (i % w) as f64 + 0.5 - r;
        let dy = (i / w) as f64 + 0.5 - r;
        let coverage = (r - (dx * dx + dy * dy).sqrt() + 0.5).clamp(0.0, 1.0);
        if coverage >= 1.0 {
            continue;
        }
        for c in px.iter_mut() {
            *c = (f64::from(*c) * coverage).round() as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/logo.rs"]
mod tests;
