//! Output writers: the frame sink contract, the ffmpeg MP4 encoder and still/audio exports.

pub mod artifact;
pub mod ffmpeg;
pub mod sink;
pub mod still;
