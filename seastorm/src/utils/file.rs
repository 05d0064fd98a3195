//! File utility functions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Expand a path string to an absolute path.
///
/// - Tilde expansion: `~` or `~/path` -> home directory
/// - Relative paths and bare names resolve against the current directory
/// - Absolute paths pass through unchanged
///
/// ```text
/// expand_path("~/.seastorm")  // -> /home/user/.seastorm
/// expand_path("./logs")       // -> /current/dir/logs
/// expand_path("/var/logs")    // -> /var/logs
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            home.join(rest)
        } else {
            PathBuf::from(path)
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Replace `path` with `contents` via a sibling temp file and rename, so
/// readers never see a half-written document.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .with_context(|| format!("Failed to write file: {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}
