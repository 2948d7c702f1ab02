//! Candidate file discovery for `--all`.

use crate::error::BatchError;
use glob::{glob, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find every file under `project_root/source_root` matching `patterns`.
///
/// Results are de-duplicated and sorted. Finding nothing is an error.
pub fn discover(
    project_root: &Path,
    source_root: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, BatchError> {
    let base = project_root.join(source_root);
    // The base is literal; only the configured patterns may hold wildcards.
    let literal_base = Pattern::escape(&base.to_string_lossy());
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();
    for pat in patterns {
        let pattern = format!("{}/{}", literal_base.trim_end_matches('/'), pat);
        let entries = glob(&pattern).map_err(|source| BatchError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    found.insert(path);
                }
                Ok(_) => {}
                Err(e) => debug!(
                    path = %e.path().display(),
                    error = %e.error(),
                    "skipping unreadable entry"
                ),
            }
        }
    }
    debug!(root = %base.display(), count = found.len(), "discovery finished");
    if found.is_empty() {
        return Err(BatchError::NoFilesFound { root: base });
    }
    Ok(found.into_iter().collect())
}

/// Render `path` relative to `base` when it lives underneath it.
pub fn display_path(path: &Path, base: &Path) -> String {
    match pathdiff::diff_paths(path, base) {
        Some(rel) if !rel.starts_with("..") => rel.to_string_lossy().to_string(),
        _ => path.to_string_lossy().to_string(),
    }
}
