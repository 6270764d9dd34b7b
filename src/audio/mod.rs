//! Decoded PCM buffers and the voice/music mix.

pub mod mix;
pub mod pcm;
