//! HTTP gateway for gridquery.
//!
//! Exposes the query executor over three routes:
//!
//! - `GET /api/health` - liveness probe
//! - `POST /api/query` - one page of pattern matches
//! - `POST /api/count` - total match count for a pattern
//!
//! Client-class errors surface as HTTP 400, everything else as 500,
//! always in a `{"error": "..."}` envelope. CORS and request tracing
//! are applied at the router; configuration comes from the
//! environment.

use std::net::SocketAddr;
use std::sync::Arc;

use gq_query::QueryExecutor;
use gq_storage::ListingBackend;
use thiserror::Error;
use tokio::net::TcpListener;

mod config;
mod routes;

pub use config::ServerConfig;
pub use routes::build_router;

/// Errors from binding and serving the HTTP listener.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Bind and run the gateway until a shutdown signal arrives.
pub async fn serve(config: ServerConfig, backend: Arc<dyn ListingBackend>) -> Result<(), ServeError> {
    let executor = Arc::new(QueryExecutor::new(backend, config.query.clone()));
    let router = build_router(executor, &config);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ServeError::Bind { address, source })?;

    tracing::info!(%address, "gridquery server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServeError::Serve { source })
}

/// Resolve when Ctrl-C or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("shutting down on Ctrl-C"),
        _ = terminate => tracing::info!("shutting down on SIGTERM"),
    }
}
