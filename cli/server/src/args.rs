//! CLI argument definitions for gq-server.

use clap::{Parser, ValueEnum};

/// Pattern-driven object listing over Cloud Storage.
///
/// Serves the query API over HTTP. Most configuration comes from the
/// environment (PORT, ALLOWED_ORIGINS, GCS_BUCKET, REQUEST_TIMEOUT,
/// WORKER_COUNT, DEFAULT_PAGE_SIZE, MIN_PAGE_SIZE, MAX_PAGE_SIZE,
/// PREFETCH_PAGES); flags below override it.
///
/// ## Examples
///
/// Serve on the default port:
///   gq-server
///
/// Override the port and chatter more:
///   gq-server --port 9090 --log-level debug
#[derive(Parser, Debug)]
#[command(name = "gq-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Listen port (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Log level argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}
