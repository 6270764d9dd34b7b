//! Layer plan, premultiplied compositing and the per-frame compositor.

pub mod composite;
pub mod compositor;
pub mod plan;
