//! The listing capability and its request/response types.

use async_trait::async_trait;
use gq_error::Result;
use serde::{Deserialize, Serialize};

/// A single listing query against a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Bucket to list; required.
    pub bucket: String,
    /// Only names starting with this prefix are returned.
    pub prefix: String,
    /// `"/"` requests delimiter-grouped listing; empty requests a flat
    /// listing.
    pub delimiter: String,
    /// Opaque resumption token from a previous page.
    pub page_token: Option<String>,
    /// Cap on the combined number of objects and prefixes returned;
    /// `0` leaves the cap to the backend.
    pub page_size: usize,
}

impl ListRequest {
    /// Create a new flat-listing request for the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Set the name prefix to list under.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the grouping delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Resume from a previous page's token.
    pub fn with_page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Cap the combined page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// The subset of object metadata the query path cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object name within the bucket.
    pub name: String,
}

/// One page of listing results.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Objects directly matching the request.
    pub objects: Vec<ObjectEntry>,
    /// Common prefixes (each ending in the delimiter); empty for flat
    /// listings.
    pub prefixes: Vec<String>,
    /// Token resuming the listing, absent on the final page.
    pub next_page_token: Option<String>,
}

/// Capability trait over bucket listings.
///
/// Implementations include:
/// - [`GcsBackend`](crate::GcsBackend) - Cloud Storage JSON API (production)
/// - [`MemoryBackend`](crate::MemoryBackend) - in-memory (tests/development)
///
/// Implementations must treat an empty bucket as an error and must
/// return at most `page_size` combined entries when a cap is set.
#[async_trait]
pub trait ListingBackend: Send + Sync {
    /// Execute one listing page.
    async fn list(&self, request: ListRequest) -> Result<ListPage>;
}
