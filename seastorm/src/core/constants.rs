// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "seastorm";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".seastorm";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "seastorm.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SEASTORM_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SEASTORM_LOG";

// =============================================================================
// Environment Variables - Input / Output
// =============================================================================

/// Environment variable for the directory of harvested process logs
pub const ENV_LOGS_DIR: &str = "SEASTORM_LOGS_DIR";

/// Environment variable for the process alias file
pub const ENV_ALIASES: &str = "SEASTORM_ALIASES";

/// Environment variable for the process log file extension
pub const ENV_LOG_EXTENSION: &str = "SEASTORM_LOG_EXTENSION";

/// Environment variable for the output document path
pub const ENV_OUTPUT: &str = "SEASTORM_OUTPUT";

/// Environment variable for the watch poll interval
pub const ENV_WATCH_INTERVAL_SECS: &str = "SEASTORM_WATCH_INTERVAL_SECS";

// =============================================================================
// Defaults
// =============================================================================

/// Default process log file extension
pub const DEFAULT_LOG_EXTENSION: &str = "log";

/// Default watch poll interval in seconds
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 2;
