//! Overlay layout: wrapping, anchors, text rasterization, the circular logo and layer styles.

pub mod anchor;
pub mod logo;
pub mod style;
pub mod text;
pub mod wrap;
