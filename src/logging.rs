//! stderr tracing setup for the binaries.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Minimum level that is emitted.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Phase progress (default).
    Info,
    /// Per-page and per-worker detail.
    Debug,
    /// Everything.
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Line format of log output.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging flags shared by the binaries.
#[derive(Args, Debug, Clone)]
pub struct LoggingArgs {
    /// Minimum log level
    #[arg(long, env = "YGOCATALOG_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log line format
    #[arg(long, env = "YGOCATALOG_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl LoggingArgs {
    /// Installs the global subscriber described by these flags.
    pub fn init(&self) -> Result<()> {
        init_tracing(self.log_level, self.log_format)
    }
}

/// Installs a global `tracing` subscriber writing to stderr.
pub fn init_tracing(level: LogLevel, format: LogFormat) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(Level::from(level))
        .with_target(false)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
    .context("failed to install tracing subscriber")
}
