//! Input assets: required-file checks, ffprobe metadata, audio/video/image decoding.

pub mod decode;
pub mod inputs;
pub mod media;
