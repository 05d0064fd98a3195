//! Core application

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::MissedTickBehavior;

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::domain::trace::{
    Ordering, ProcessMap, Trace, assemble_with_report, collect, ordering_with_report,
};
use crate::utils::file::write_atomic;

pub struct CoreApp {
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;
        match command.unwrap_or(Commands::Resolve) {
            Commands::Resolve => app.resolve().await,
            Commands::Trace => app.trace().await,
            Commands::Order { trace } => app.order(&trace).await,
            Commands::Watch { .. } => app.watch().await,
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        Ok(Self { config })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // stdout carries the JSON document
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Logs directory -> resolved ordering document
    async fn resolve(&self) -> Result<()> {
        let ordering = self.poll_once().await?;
        self.emit(&self.encode_ordering(&ordering)?).await
    }

    /// Logs directory -> unresolved trace document
    async fn trace(&self) -> Result<()> {
        let (logs, aliases) = self.collect().await?;
        let (trace, _) = assemble_with_report(&logs, aliases.as_ref())?;
        let json = if self.config.pretty {
            trace.to_json_pretty()?
        } else {
            trace.to_json()?
        };
        self.emit(&json).await
    }

    /// Saved trace document -> resolved ordering document
    async fn order(&self, path: &Path) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read trace file: {}", path.display()))?;
        let trace = Trace::from_json(&content)
            .with_context(|| format!("Failed to load trace file: {}", path.display()))?;
        let (ordering, report) = ordering_with_report(&trace)?;
        tracing::debug!(
            dropped_receives = report.dropped_receives,
            "Resolved saved trace"
        );
        self.emit(&self.encode_ordering(&ordering)?).await
    }

    /// Re-run the full pipeline every poll interval until Ctrl-C
    async fn watch(&self) -> Result<()> {
        self.config.require_logs_dir()?;
        let output = self.config.require_output()?;

        let interval = Duration::from_secs(self.config.watch.interval_secs);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        tracing::info!(
            interval_secs = self.config.watch.interval_secs,
            output = %output.display(),
            "Watching process logs"
        );

        let mut last: Option<String> = None;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Watch stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.refresh(&mut last).await {
                // Logs are harvested independently; the next batch may be consistent
                tracing::warn!(error = %e, "Failed to resolve logs, retrying on next poll");
            }
        }
    }

    /// One watch iteration; emits only when the ordering changed
    async fn refresh(&self, last: &mut Option<String>) -> Result<bool> {
        let ordering = self.poll_once().await?;
        let json = self.encode_ordering(&ordering)?;
        if last.as_deref() == Some(json.as_str()) {
            tracing::trace!("Ordering unchanged");
            return Ok(false);
        }

        self.emit(&json).await?;
        let summary = ordering.summary();
        tracing::info!(
            processes = summary.processes,
            sends = summary.sends,
            receives = summary.receives,
            logs = summary.logs,
            undelivered = summary.undelivered,
            "Ordering updated"
        );
        *last = Some(json);
        Ok(true)
    }

    /// Collect logs and run the whole pipeline once
    async fn poll_once(&self) -> Result<Ordering> {
        let (logs, aliases) = self.collect().await?;
        let (trace, assembly) = assemble_with_report(&logs, aliases.as_ref())?;
        let (ordering, order) = ordering_with_report(&trace)?;
        tracing::debug!(
            processes = assembly.processes,
            events = ordering.events.len(),
            dropped_sends = assembly.dropped_sends,
            dropped_receives = order.dropped_receives,
            "Pipeline complete"
        );
        Ok(ordering)
    }

    async fn collect(&self) -> Result<(ProcessMap, Option<ProcessMap>)> {
        let dir = self.config.require_logs_dir()?;
        let logs = collect::read_logs_dir(dir, &self.config.log_extension).await?;
        let aliases = match &self.config.aliases {
            Some(path) => Some(collect::read_aliases(path).await?),
            None => None,
        };
        Ok((logs, aliases))
    }

    fn encode_ordering(&self, ordering: &Ordering) -> Result<String> {
        let json = if self.config.pretty {
            ordering.to_json_pretty()?
        } else {
            ordering.to_json()?
        };
        Ok(json)
    }

    async fn emit(&self, json: &str) -> Result<()> {
        match &self.config.output {
            Some(path) => {
                write_atomic(path, json).await?;
                tracing::debug!(path = %path.display(), bytes = json.len(), "Document written");
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}
