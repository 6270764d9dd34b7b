use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::inputs::read_bytes;
use crate::foundation::color::Color;
use crate::foundation::core::FrameRgba;
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::wrap::wrap_text;

const LINE_HEIGHT: f64 = 1.2;
const MAX_DIM: u32 = 16_384;
const FIT_ATTEMPTS: usize = 6;

/// A single font file loaded into its own font database.
#[derive(Clone)]
pub struct FontFace {
    db: Arc<usvg::fontdb::Database>,
    family: String,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl FontFace {
    pub fn load(path: &Path) -> ReelResult<Self> {
        let bytes = read_bytes("font", path)?;
        Self::from_bytes(bytes).map_err(|e| match e {
            ReelError::InvalidAsset(msg) => {
                ReelError::invalid_asset(format!("font '{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> ReelResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes);
        let family = db
            .faces()
            .next()
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .ok_or_else(|| ReelError::invalid_asset("no usable font face"))?;
        Ok(Self {
            db: Arc::new(db),
            family,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Start,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Paint and wrapping parameters of one text layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub fill: Color,
    #[serde(default)]
    pub stroke: Option<Stroke>,
    /// Wrap width in characters.
    #[serde(default)]
    pub wrap_width: Option<usize>,
    #[serde(default)]
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(font_size: f64, fill: Color) -> Self {
        Self {
            font_size,
            fill,
            stroke: None,
            wrap_width: None,
            align: TextAlign::Start,
        }
    }

    pub fn wrapped(mut self, width: usize) -> Self {
        self.wrap_width = Some(width);
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        self.font_size *= factor;
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.width *= factor;
        }
        self
    }
}

/// Rasterize `content` and crop the result to its visible pixels.
///
/// The returned sprite's size is the measured bounding box used for anchoring.
#[tracing::instrument(skip(font, style), fields(font = font.family()))]
pub fn render_text(font: &FontFace, content: &str, style: &TextStyle) -> ReelResult<FrameRgba> {
    if !style.font_size.is_finite() || style.font_size <= 0.0 {
        return Err(ReelError::validation("font size must be > 0"));
    }
    let lines = wrap_text(content, style.wrap_width);
    let doc = build_svg(font.family(), &lines, style)?;

    let opts = usvg::Options {
        fontdb: font.db.clone(),
        font_resolver: single_face_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&doc.svg, &opts)
        .map_err(|e| ReelError::invalid_asset(format!("text layout failed: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(doc.width, doc.height)
        .ok_or_else(|| ReelError::geometry("failed to allocate text pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    let full = FrameRgba::from_premul(doc.width, doc.height, pixmap.take())?;
    crop_to_alpha(&full).ok_or_else(|| {
        ReelError::invalid_asset(format!("text {content:?} renders no visible pixels"))
    })
}

/// Rasterize like [`render_text`], shrinking the font until the cropped box fits
/// `max_width` x `max_height`.
pub fn render_text_fitted(
    font: &FontFace,
    content: &str,
    style: &TextStyle,
    max_width: u32,
    max_height: u32,
) -> ReelResult<FrameRgba> {
    if max_width == 0 || max_height == 0 {
        return Err(ReelError::geometry("text box limit must be non-zero"));
    }
    let mut style = style.clone();
    let lines = wrap_text(content, style.wrap_width);
    let (w, h) = raster_extent(&lines, &style);
    let largest = w.max(h);
    if largest > f64::from(MAX_DIM) {
        style = style.scaled(0.99 * f64::from(MAX_DIM) / largest);
    }

    for _ in 0..FIT_ATTEMPTS {
        let sprite = render_text(font, content, &style)?;
        if sprite.width <= max_width && sprite.height <= max_height {
            return Ok(sprite);
        }
        let factor = (f64::from(max_width) / f64::from(sprite.width))
            .min(f64::from(max_height) / f64::from(sprite.height))
            .min(1.0)
            * 0.95;
        tracing::debug!(
            from = style.font_size,
            to = style.font_size * factor,
            "shrinking text to fit"
        );
        style = style.scaled(factor);
    }
    Err(ReelError::geometry(format!(
        "text does not fit {max_width}x{max_height} after {FIT_ATTEMPTS} attempts"
    )))
}

fn single_face_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|_font, fontdb| fontdb.faces().next().map(|f| f.id)),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

pub(crate) struct SvgText {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// Lay the lines out as an SVG document large enough to hold them.
pub(crate) fn build_svg(family: &str, lines: &[String], style: &TextStyle) -> ReelResult<SvgText> {
    let size = style.font_size;
    let pad = text_pad(style);
    let (w, h) = raster_extent(lines, style);
    if w > f64::from(MAX_DIM) || h > f64::from(MAX_DIM) {
        return Err(ReelError::geometry(format!(
            "text raster size too large: {w:.0}x{h:.0}"
        )));
    }
    let (width, height) = (w as u32, h as u32);

    let (x, anchor) = match style.align {
        TextAlign::Start => (pad, "start"),
        TextAlign::Center => (f64::from(width) / 2.0, "middle"),
    };

    let mut paint = format!(
        r#"font-family="{}" font-size="{size}" fill="{}" fill-opacity="{}" text-anchor="{anchor}""#,
        escape_xml(family),
        style.fill.svg_rgb(),
        style.fill.svg_opacity(),
    );
    if let Some(stroke) = style.stroke.filter(|s| s.width > 0.0) {
        paint.push_str(&format!(
            r#" stroke="{}" stroke-opacity="{}" stroke-width="{}" paint-order="stroke""#,
            stroke.color.svg_rgb(),
            stroke.color.svg_opacity(),
            stroke.width
        ));
    }

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    for (i, line) in lines.iter().enumerate() {
        let baseline = pad + size + i as f64 * size * LINE_HEIGHT;
        svg.push_str(&format!(
            r#"<text x="{x}" y="{baseline}" xml:space="preserve" {paint}>{}</text>"#,
            escape_xml(line)
        ));
    }
    svg.push_str("</svg>");

    Ok(SvgText { svg, width, height })
}

fn text_pad(style: &TextStyle) -> f64 {
    let stroke_w = style.stroke.map(|s| s.width.max(0.0)).unwrap_or(0.0);
    (style.font_size * 0.5 + stroke_w).ceil()
}

/// Pixel size of the SVG canvas that holds `lines`, rounded up.
fn raster_extent(lines: &[String], style: &TextStyle) -> (f64, f64) {
    let size = style.font_size;
    let pad = text_pad(style);
    let max_chars = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);
    let line_count = lines.len().max(1);
    let width = (max_chars as f64 * size + 2.0 * pad).ceil();
    let height = ((line_count - 1) as f64 * size * LINE_HEIGHT + size * 1.4 + 2.0 * pad).ceil();
    (width, height)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Smallest sub-image containing every non-transparent pixel, or `None` when fully transparent.
pub(crate) fn crop_to_alpha(frame: &FrameRgba) -> Option<FrameRgba> {
    let w = frame.width as usize;
    let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0usize, 0usize);
    for (i, px) in frame.data.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let (x, y) = (i % w, i / w);
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    if x0 == usize::MAX {
        return None;
    }

    let (cw, ch) = (x1 - x0 + 1, y1 - y0 + 1);
    let mut data = Vec::with_capacity(cw * ch * 4);
    for y in y0..=y1 {
        let start = (y * w + x0) * 4;
        data.extend_from_slice(&frame.data[start..start + cw * 4]);
    }
    Some(FrameRgba {
        width: cw as u32,
        height: ch as u32,
        data,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
