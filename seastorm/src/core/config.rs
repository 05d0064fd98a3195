use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_LOG_EXTENSION, DEFAULT_WATCH_INTERVAL_SECS,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Log input configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogsFileConfig {
    /// Directory of harvested process logs
    pub dir: Option<String>,
    /// Process alias file (JSON object id -> name)
    pub aliases: Option<String>,
    /// Process log file extension (default: "log")
    pub extension: Option<String>,
}

/// Output configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputFileConfig {
    pub path: Option<String>,
    /// Pretty-print JSON output (default: true)
    pub pretty: Option<bool>,
}

/// Watch mode configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WatchFileConfig {
    pub interval_secs: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub logs: Option<LogsFileConfig>,
    pub output: Option<OutputFileConfig>,
    pub watch: Option<WatchFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Names of fields not understood by this version
    fn unknown_fields(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(|k| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(logs) = other.logs {
            let current = self.logs.get_or_insert_with(LogsFileConfig::default);
            if logs.dir.is_some() {
                tracing::trace!(dir = ?logs.dir, "Merging logs.dir");
                current.dir = logs.dir;
            }
            if logs.aliases.is_some() {
                tracing::trace!(aliases = ?logs.aliases, "Merging logs.aliases");
                current.aliases = logs.aliases;
            }
            if logs.extension.is_some() {
                tracing::trace!(extension = ?logs.extension, "Merging logs.extension");
                current.extension = logs.extension;
            }
        }

        if let Some(output) = other.output {
            let current = self.output.get_or_insert_with(OutputFileConfig::default);
            if output.path.is_some() {
                tracing::trace!(path = ?output.path, "Merging output.path");
                current.path = output.path;
            }
            if output.pretty.is_some() {
                tracing::trace!(pretty = ?output.pretty, "Merging output.pretty");
                current.pretty = output.pretty;
            }
        }

        if let Some(watch) = other.watch {
            let current = self.watch.get_or_insert_with(WatchFileConfig::default);
            if watch.interval_secs.is_some() {
                tracing::trace!(interval_secs = ?watch.interval_secs, "Merging watch.interval_secs");
                current.interval_secs = watch.interval_secs;
            }
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Watch mode settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

/// Application configuration after layering all sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub logs_dir: Option<PathBuf>,
    pub aliases: Option<PathBuf>,
    pub log_extension: String,
    pub output: Option<PathBuf>,
    pub pretty: bool,
    pub watch: WatchConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.seastorm/seastorm.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.seastorm/seastorm.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Ok(Self::from_sources(cli, file_config))
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_logs = file_config.logs.unwrap_or_default();
        let file_output = file_config.output.unwrap_or_default();
        let file_watch = file_config.watch.unwrap_or_default();

        let logs_dir = cli
            .logs_dir
            .clone()
            .or_else(|| file_logs.dir.as_deref().map(expand_path));

        let aliases = cli
            .aliases
            .clone()
            .or_else(|| file_logs.aliases.as_deref().map(expand_path));

        let log_extension = cli
            .log_extension
            .clone()
            .or(file_logs.extension)
            .map(|ext| ext.trim_start_matches('.').to_string())
            .unwrap_or_else(|| DEFAULT_LOG_EXTENSION.to_string());

        let output = cli
            .output
            .clone()
            .or_else(|| file_output.path.as_deref().map(expand_path));

        // pretty: --compact CLI flag disables, then file config, default true
        let pretty = if cli.compact {
            false
        } else {
            file_output.pretty.unwrap_or(true)
        };

        let interval_secs = cli
            .watch_interval_secs
            .or(file_watch.interval_secs)
            .unwrap_or(DEFAULT_WATCH_INTERVAL_SECS)
            .max(1);

        let config = Self {
            logs_dir,
            aliases,
            log_extension,
            output,
            pretty,
            watch: WatchConfig { interval_secs },
        };
        tracing::debug!(config = ?config, "Configuration resolved");
        config
    }

    /// Log directory, required by commands that read logs
    pub fn require_logs_dir(&self) -> Result<&Path> {
        self.logs_dir.as_deref().context(
            "No log directory configured. Pass --logs-dir, set SEASTORM_LOGS_DIR, \
             or set logs.dir in seastorm.json",
        )
    }

    /// Output file, required by watch mode
    pub fn require_output(&self) -> Result<&Path> {
        self.output.as_deref().context(
            "No output file configured for watch. Pass --output, set SEASTORM_OUTPUT, \
             or set output.path in seastorm.json",
        )
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
