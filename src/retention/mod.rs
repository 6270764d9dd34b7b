//! Bounded-age, bounded-count cleanup of generated artifacts.

pub mod sweep;
