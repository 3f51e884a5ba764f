//! Logging and tracing setup for the restore CLI
//!
//! Console logs go to stderr so they never interleave with the progress
//! stream on stdout. A daily-rotated JSON log file is written alongside,
//! which is what to attach when reporting a failed restore.
//!
//! `RUST_LOG` takes precedence over the verbosity-derived filters.

use std::path::PathBuf;

use anyhow::Context;
use clap::ValueEnum;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "zqlz-restore.log";

/// Console log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log file; `None` disables it
    pub log_dir: Option<PathBuf>,
    pub format: LogFormat,
    /// Number of `-v` flags given
    pub verbosity: u8,
    /// Whether to include file/line information in console logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: Some(log_directory()),
            format: LogFormat::Pretty,
            verbosity: 0,
            include_location: cfg!(debug_assertions),
        }
    }
}

impl LoggingConfig {
    /// Console filter: warnings only by default, since progress is printed
    /// separately; each `-v` opens up one more level for the restore crates
    pub fn console_filter(&self) -> String {
        let level = match self.verbosity {
            0 => return "warn".to_string(),
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        format!(
            "warn,zqlz_cli={level},zqlz_restore={level},zqlz_driver_postgres={level},zqlz_core={level}"
        )
    }

    pub fn file_filter(&self) -> String {
        let level = if self.verbosity >= 2 { "debug" } else { "info" };
        format!(
            "warn,zqlz_cli={level},zqlz_restore={level},zqlz_driver_postgres={level},zqlz_core={level}"
        )
    }
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize the logging system.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the process exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let mut layers = Vec::new();

    let console_layer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_filter(filter(&config.console_filter()))
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_filter(filter(&config.console_filter()))
            .boxed(),
    };
    layers.push(console_layer);

    let mut guard = None;
    if let Some(log_dir) = &config.log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(filter(&config.file_filter()))
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Logging was already initialized")?;

    tracing::debug!(
        log_dir = ?config.log_dir,
        format = ?config.format,
        verbosity = config.verbosity,
        "logging initialized"
    );
    Ok(guard)
}

/// Default directory for log files
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zqlz")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quiet_console_by_default() {
        let config = LoggingConfig::default();

        assert_eq!(config.console_filter(), "warn");
        assert!(config.file_filter().contains("zqlz_restore=info"));
    }

    #[test]
    fn test_verbosity_raises_levels() {
        let config = LoggingConfig {
            verbosity: 2,
            ..LoggingConfig::default()
        };

        assert!(config.console_filter().contains("zqlz_restore=debug"));
        assert!(config.file_filter().contains("zqlz_driver_postgres=debug"));

        let config = LoggingConfig {
            verbosity: 5,
            ..LoggingConfig::default()
        };
        assert!(config.console_filter().contains("zqlz_core=trace"));
    }

    #[test]
    fn test_log_directory_is_under_zqlz() {
        assert!(log_directory().ends_with("zqlz/logs"));
    }
}
