use std::path::{Path, PathBuf};

/// Convenience result type used across reelforge.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy shared by every pipeline stage.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// A required input file is absent.
    #[error("missing asset: {what} not found at '{}'", .path.display())]
    MissingAsset {
        /// Human-readable role of the asset ("font", "logo", ...).
        what: String,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// An input exists but cannot be used (zero duration, unreadable, unsupported layout).
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// A requested crop or placement is impossible without distortion or overflow.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Codec, container or output write failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A retention deletion failed.
    #[error("cleanup error: {0}")]
    Cleanup(String),

    /// Invalid configuration or plan values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::MissingAsset`] value.
    pub fn missing_asset(what: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::MissingAsset {
            what: what.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Build a [`ReelError::InvalidAsset`] value.
    pub fn invalid_asset(msg: impl Into<String>) -> Self {
        Self::InvalidAsset(msg.into())
    }

    /// Build a [`ReelError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`ReelError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ReelError::Cleanup`] value.
    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }

    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short tag naming the pipeline stage this error kind belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingAsset { .. } | Self::InvalidAsset(_) => "assets",
            Self::Geometry(_) => "geometry",
            Self::Encoding(_) => "encode",
            Self::Cleanup(_) => "retention",
            Self::Validation(_) => "config",
            Self::Other(_) => "io",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
