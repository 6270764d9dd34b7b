use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// A rendered file on disk. Never modified after it is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputArtifact {
    pub path: PathBuf,
    /// Filesystem modification time.
    pub modified: SystemTime,
    pub size_bytes: u64,
}

impl OutputArtifact {
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let meta = std::fs::metadata(path)
            .with_context(|| format!("stat output '{}'", path.display()))?;
        let modified = meta
            .modified()
            .with_context(|| format!("read mtime of '{}'", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            modified,
            size_bytes: meta.len(),
        })
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Create `path`'s parent directory and open a temp file beside it.
///
/// The temp file is deleted on drop unless persisted onto `path`.
pub(crate) fn staging_file(path: &Path) -> ReelResult<tempfile::NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create output directory '{}'", dir.display()))?;
    let suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let tmp = tempfile::Builder::new()
        .prefix(".reelforge-")
        .suffix(&suffix)
        .tempfile_in(&dir)
        .with_context(|| format!("create staging file in '{}'", dir.display()))?;
    Ok(tmp)
}

/// Atomically move a finished staging file onto `path`.
pub(crate) fn publish(tmp: tempfile::NamedTempFile, path: &Path) -> ReelResult<OutputArtifact> {
    tmp.persist(path).map_err(|e| {
        ReelError::encoding(format!(
            "move finished output onto '{}': {}",
            path.display(),
            e.error
        ))
    })?;
    OutputArtifact::from_path(path)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
