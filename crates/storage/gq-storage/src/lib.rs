//! Object-store listing backends for gridquery.
//!
//! This crate provides the single listing capability the query executor
//! depends on:
//!
//! - [`ListingBackend`] - one-method trait over bucket listings
//! - [`GcsBackend`] - implementation speaking the Cloud Storage JSON API
//! - [`MemoryBackend`] - deterministic in-memory implementation for
//!   tests and local development
//!
//! # Example
//!
//! ```no_run
//! use gq_storage::{GcsBackend, ListRequest, ListingBackend};
//!
//! # async fn demo() -> gq_error::Result<()> {
//! let backend = GcsBackend::new(reqwest::Client::new());
//! let page = backend
//!     .list(
//!         ListRequest::new("my-bucket")
//!             .with_prefix("data/")
//!             .with_delimiter("/"),
//!     )
//!     .await?;
//! println!("{} prefixes under data/", page.prefixes.len());
//! # Ok(())
//! # }
//! ```

mod backend;
mod gcs;
mod memory;

pub use backend::{ListPage, ListRequest, ListingBackend, ObjectEntry};
pub use gcs::GcsBackend;
pub use memory::MemoryBackend;
