//! Local log collection
//!
//! Reads harvested logs from disk into the mappings the assembler consumes:
//! one `<process id>.<extension>` file per process, and an optional JSON alias
//! file (`{"<process id>": "<display name>"}`).

use std::path::Path;

use anyhow::{Context, Result};

use super::types::ProcessMap;

/// Read every `*.<extension>` file in `dir` as a process log keyed by file stem.
pub async fn read_logs_dir(dir: &Path, extension: &str) -> Result<ProcessMap> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?;

    let mut logs = ProcessMap::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(process) = log_process_id(&path, extension) else {
            tracing::trace!(path = %path.display(), "Skipping non-log file");
            continue;
        };
        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read log file: {}", path.display()))?;
        logs.insert(process, contents);
    }

    tracing::debug!(dir = %dir.display(), logs = logs.len(), "Collected process logs");
    Ok(logs)
}

/// Read a JSON alias file (process id -> display name).
pub async fn read_aliases(path: &Path) -> Result<ProcessMap> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read alias file: {}", path.display()))?;
    let aliases: ProcessMap = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse alias file: {}", path.display()))?;
    tracing::debug!(path = %path.display(), aliases = aliases.len(), "Loaded process aliases");
    Ok(aliases)
}

/// Process id for a log file path, or `None` if the extension doesn't match
fn log_process_id(path: &Path, extension: &str) -> Option<String> {
    let matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if !matches {
        return None;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}
