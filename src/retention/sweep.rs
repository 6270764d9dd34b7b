use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context as _;

use crate::config::RetentionConfig;
use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Debug, PartialEq)]
pub struct RetentionPolicy {
    pub directory: PathBuf,
    /// Shell-style file-name glob (`*`, `?`, `[...]`).
    pub pattern: String,
    pub max_age_hours: f64,
    pub min_files_to_keep: usize,
}

impl RetentionPolicy {
    pub fn from_config(directory: impl Into<PathBuf>, cfg: &RetentionConfig) -> Self {
        Self {
            directory: directory.into(),
            pattern: cfg.pattern.clone(),
            max_age_hours: cfg.max_age_hours,
            min_files_to_keep: cfg.min_files_to_keep,
        }
    }

    fn max_age_secs(&self) -> f64 {
        self.max_age_hours * 3600.0
    }
}

/// Outcome of one retention pass.
#[derive(Debug, Default)]
pub struct RetentionReport {
    /// Matching files left in place, newest first.
    pub kept: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Deletions that failed; the pass continued past each of them.
    pub failures: Vec<ReelError>,
}

/// Delete matching files older than the policy age, never touching the newest
/// `min_files_to_keep`.
pub fn enforce_retention(policy: &RetentionPolicy, now: SystemTime) -> ReelResult<RetentionReport> {
    enforce_retention_with(policy, now, |p| std::fs::remove_file(p))
}

#[tracing::instrument(skip(remove), fields(dir = %policy.directory.display()))]
pub(crate) fn enforce_retention_with(
    policy: &RetentionPolicy,
    now: SystemTime,
    mut remove: impl FnMut(&Path) -> std::io::Result<()>,
) -> ReelResult<RetentionReport> {
    let pattern = file_pattern(&policy.pattern)?;
    let mut report = RetentionReport::default();
    if !policy.directory.is_dir() {
        return Ok(report);
    }

    let mut candidates = list_candidates(&policy.directory, &pattern)?;
    // Newest first; name breaks ties so the order is stable.
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let max_age = policy.max_age_secs();
    for (i, (path, modified)) in candidates.into_iter().enumerate() {
        if i < policy.min_files_to_keep {
            report.kept.push(path);
            continue;
        }
        let age = now
            .duration_since(modified)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        if age <= max_age {
            report.kept.push(path);
            continue;
        }
        match remove(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), age_secs = age, "deleted expired artifact");
                report.deleted.push(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to delete expired artifact");
                report.failures.push(ReelError::cleanup(format!(
                    "delete '{}': {e}",
                    path.display()
                )));
                report.kept.push(path);
            }
        }
    }

    tracing::info!(
        kept = report.kept.len(),
        deleted = report.deleted.len(),
        failed = report.failures.len(),
        "retention pass finished"
    );
    Ok(report)
}

/// Compile a retention file-name glob.
pub(crate) fn file_pattern(pattern: &str) -> ReelResult<glob::Pattern> {
    glob::Pattern::new(pattern).map_err(|e| {
        ReelError::validation(format!("retention pattern '{pattern}' is invalid: {e}"))
    })
}

fn list_candidates(
    directory: &Path,
    pattern: &glob::Pattern,
) -> ReelResult<Vec<(PathBuf, SystemTime)>> {
    let rd = std::fs::read_dir(directory)
        .with_context(|| format!("list '{}'", directory.display()))?;
    let mut out = Vec::new();
    for entry in rd.flatten() {
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !pattern.matches(&name) {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "skipping unreadable artifact");
                continue;
            }
        };
        match meta.modified() {
            Ok(modified) => out.push((entry.path(), modified)),
            Err(e) => tracing::warn!(file = %name, error = %e, "skipping artifact without mtime"),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/retention/sweep.rs"]
mod tests;
