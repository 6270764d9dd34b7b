//! Target duration and background loop/trim scheduling.

pub mod sync;
