use std::path::Path;

use crate::assets::inputs::read_bytes;
use crate::foundation::core::FrameRgba;
use crate::foundation::error::{ReelError, ReelResult};

/// Decode encoded image bytes into a premultiplied RGBA8 frame.
pub fn decode_image(bytes: &[u8]) -> ReelResult<FrameRgba> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ReelError::invalid_asset(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ReelError::invalid_asset("image has zero width or height"));
    }
    FrameRgba::from_straight(width, height, rgba.into_raw())
}

/// Read and decode an image file; `what` names the asset in errors.
pub fn decode_image_file(what: &str, path: &Path) -> ReelResult<FrameRgba> {
    let bytes = read_bytes(what, path)?;
    decode_image(&bytes).map_err(|e| match e {
        ReelError::InvalidAsset(msg) => {
            ReelError::invalid_asset(format!("{what} '{}': {msg}", path.display()))
        }
        other => other,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
