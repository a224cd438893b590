//! Writing generated issue documents.
//!
//! Files land in `generated-issues/` as `<YYYYmmdd_HHMMSS>_<feature>.md`.
//! When two runs in the same second pick the same name, a numeric suffix is
//! appended rather than overwriting the earlier file.

use crate::error::Result;
use crate::fs::atomic_write_file;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Longest feature fragment kept in a file name, in characters.
pub const MAX_FEATURE_NAME_LEN: usize = 50;

/// Reduce a feature description to a file-name-safe fragment.
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`.
pub fn safe_feature_name(feature: &str) -> String {
    feature
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FEATURE_NAME_LEN)
        .collect()
}

/// `<YYYYmmdd_HHMMSS>_<safe feature>.md`
pub fn issue_file_name(timestamp: DateTime<Local>, feature: &str) -> String {
    format!(
        "{}_{}.md",
        timestamp.format("%Y%m%d_%H%M%S"),
        safe_feature_name(feature)
    )
}

/// Atomically write `content` into `output_dir` and return the new file's path.
pub fn write_issue(
    output_dir: &Path,
    feature: &str,
    content: &str,
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    let path = unused_path(output_dir, &issue_file_name(timestamp, feature));
    atomic_write_file(&path, content)?;
    tracing::info!(path = %path.display(), "wrote issue file");
    Ok(path)
}

fn unused_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    (2..)
        .map(|n| dir.join(format!("{}_{}.md", stem, n)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
