use std::path::PathBuf;

/// Inputs of one vertical video render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRequest {
    /// Primary voice track (`.mp3`/`.wav`).
    pub affirmation: PathBuf,
    /// Optional music bed; without it the voice is padded with silence.
    pub music: Option<PathBuf>,
    pub background: PathBuf,
    pub logo: PathBuf,
    pub font: PathBuf,
    pub header: String,
    pub body: String,
    pub author: String,
    pub subtitle: Option<String>,
    /// Bare file name placed in the configured output directory.
    pub output_name: String,
}

/// Inputs of one still image render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    pub background: PathBuf,
    pub logo: PathBuf,
    pub font: PathBuf,
    pub header: String,
    pub body: String,
    pub subtitle: Option<String>,
    pub output_name: String,
}

/// `Some(text)` only when it has visible content.
pub(crate) fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}
