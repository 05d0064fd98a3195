use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_ALIASES, ENV_CONFIG, ENV_LOG_EXTENSION, ENV_LOGS_DIR, ENV_OUTPUT, ENV_WATCH_INTERVAL_SECS,
};

#[derive(Parser)]
#[command(name = "seastorm")]
#[command(
    version,
    about = "Reconstruct a causally ordered message trace from process logs",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory containing one `<process>.<ext>` log file per process
    #[arg(long, short = 'l', global = true, env = ENV_LOGS_DIR)]
    pub logs_dir: Option<PathBuf>,

    /// JSON file mapping process ids to display names
    #[arg(long, short = 'a', global = true, env = ENV_ALIASES)]
    pub aliases: Option<PathBuf>,

    /// File extension of process logs
    #[arg(long, global = true, env = ENV_LOG_EXTENSION)]
    pub log_extension: Option<String>,

    /// Write the document here instead of stdout
    #[arg(long, short = 'o', global = true, env = ENV_OUTPUT)]
    pub output: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    pub compact: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Resolve process logs into an ordering (default command)
    Resolve,
    /// Assemble process logs into an unresolved trace document
    Trace,
    /// Resolve a previously saved trace document
    Order {
        /// Saved trace document
        #[arg(long, short = 't')]
        trace: PathBuf,
    },
    /// Re-resolve the log directory on an interval until interrupted
    Watch {
        /// Poll interval in seconds
        #[arg(long, env = ENV_WATCH_INTERVAL_SECS)]
        interval_secs: Option<u64>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub logs_dir: Option<PathBuf>,
    pub aliases: Option<PathBuf>,
    pub log_extension: Option<String>,
    pub output: Option<PathBuf>,
    pub compact: bool,
    pub config: Option<PathBuf>,
    pub watch_interval_secs: Option<u64>,
}

impl Cli {
    /// Split parsed arguments into config and command
    pub fn into_parts(self) -> (CliConfig, Option<Commands>) {
        let watch_interval_secs = match &self.command {
            Some(Commands::Watch { interval_secs }) => *interval_secs,
            _ => None,
        };
        let config = CliConfig {
            logs_dir: self.logs_dir,
            aliases: self.aliases,
            log_extension: self.log_extension,
            output: self.output,
            compact: self.compact,
            config: self.config,
            watch_interval_secs,
        };
        (config, self.command)
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    Cli::parse().into_parts()
}
