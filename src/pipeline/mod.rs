//! Synchronous render pipeline tying the stages together.

pub mod render;
pub mod request;
