use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};

/// Fail with [`ReelError::MissingAsset`] unless `path` is an existing regular file.
pub fn require_file(what: &str, path: &Path) -> ReelResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ReelError::missing_asset(what, path))
    }
}

/// Check every `(role, path)` pair before any work starts.
pub fn require_all<'a>(inputs: impl IntoIterator<Item = (&'a str, &'a Path)>) -> ReelResult<()> {
    for (what, path) in inputs {
        require_file(what, path)?;
    }
    Ok(())
}

/// Read a file that was already checked with [`require_file`].
pub fn read_bytes(what: &str, path: &Path) -> ReelResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReelError::missing_asset(what, path),
        _ => ReelError::invalid_asset(format!("read {what} '{}': {e}", path.display())),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/inputs.rs"]
mod tests;
