//! gq-server
//!
//! gridquery's HTTP server: compiles object-name patterns and serves
//! paginated, resumable match listings from Cloud Storage.

use std::sync::Arc;

use clap::Parser;
use gq_api::ServerConfig;
use gq_storage::GcsBackend;

mod args;

use args::{Cli, LogLevel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.log_level)?;

    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let backend = Arc::new(GcsBackend::new(http));

    tracing::info!(
        port = config.port,
        bucket = %config.bucket,
        workers = config.query.worker_count,
        "starting gridquery"
    );

    gq_api::serve(config, backend).await?;

    Ok(())
}

/// Initialize logging with the specified level.
///
/// Logs are written to stderr so stdout remains clean for tooling.
fn init_logging(level: LogLevel) -> anyhow::Result<()> {
    let level: tracing::Level = level.into();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    subscriber.init();

    Ok(())
}
