//! Pattern-query planner and executor for gridquery.
//!
//! This crate drives a compiled object pattern against a listing
//! backend:
//!
//! - [`ListJob`] - tagged unit of pending listing work
//! - [`cursor`] - opaque resume-token codec carrying residual jobs
//! - [`QueryStats`] - scanned/matched counters preserved across pages
//! - [`QueryConfig`] - fan-out and page-size policy
//! - [`QueryExecutor`] - the concurrent query and count operations
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gq_query::{QueryConfig, QueryExecutor, QueryRequest};
//! use gq_storage::MemoryBackend;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> gq_error::Result<()> {
//! let backend = Arc::new(MemoryBackend::new(["shots/a/img_01.jpg"]));
//! let executor = QueryExecutor::new(backend, QueryConfig::default());
//!
//! let response = executor
//!     .query(&QueryRequest {
//!         pattern: "gs://b/shots/%dir%/img_%idx%.jpg".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! assert_eq!(response.items.len(), 1);
//! assert_eq!(response.items[0].captures["idx"], "01");
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod cursor;
mod executor;
mod job;
mod stats;

pub use config::QueryConfig;
pub use cursor::CursorState;
pub use executor::QueryExecutor;
pub use job::ListJob;
pub use stats::QueryStats;

/// A query as submitted over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    /// The pattern, `gs://bucket/...`.
    pub pattern: String,
    /// Dialect name; empty defaults to percent.
    pub mode: String,
    /// Requested page size; non-positive means the configured default.
    pub page_size: i64,
    /// Resume token from a previous page, empty for a fresh query.
    pub cursor: String,
}

/// A single matched object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    /// Full object name within the bucket.
    pub object: String,
    /// Public URL of the object.
    pub url: String,
    /// Capture name → matched substring.
    pub captures: HashMap<String, String>,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Capture names in pattern order.
    pub capture_names: Vec<String>,
    /// Matched items, at most the effective page size.
    pub items: Vec<QueryItem>,
    /// Resume token; absent when the enumeration is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Counters accumulated since the start of the walk.
    pub stats: QueryStats,
}

/// Result of a count operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    /// Total matches across the whole walk, cursor rounds included.
    pub total: u64,
    /// Counters accumulated since the start of the walk.
    pub stats: QueryStats,
}
