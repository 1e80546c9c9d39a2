//! Configuration for the query executor.

use serde::{Deserialize, Serialize};

/// Default parallel listing fan-out.
pub const DEFAULT_WORKER_COUNT: usize = 8;
/// Default page size when the request does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Default lower clamp bound for page sizes.
pub const DEFAULT_MIN_PAGE_SIZE: usize = 25;
/// Default upper clamp bound for page sizes; also the backend page cap.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 500;
/// Default backend pages fetched per objects-job dispatch.
pub const DEFAULT_PREFETCH_PAGES: usize = 1;

/// Immutable policy record handed to the executor at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Backend listings dispatched concurrently per batch; floored at 1.
    pub worker_count: usize,

    /// Page size used when a request asks for none.
    pub default_page_size: usize,

    /// Lower bound of the page-size clamp.
    pub min_page_size: usize,

    /// Upper bound of the page-size clamp and the per-listing cap.
    pub max_page_size: usize,

    /// Backend pages an objects job may fetch in one dispatch; values
    /// below 1 behave as 1.
    pub prefetch_pages: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            default_page_size: DEFAULT_PAGE_SIZE,
            min_page_size: DEFAULT_MIN_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            prefetch_pages: DEFAULT_PREFETCH_PAGES,
        }
    }
}

impl QueryConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parallel listing fan-out.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the default page size.
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the page-size clamp bounds.
    pub fn with_page_size_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_page_size = min;
        self.max_page_size = max;
        self
    }

    /// Set the per-dispatch prefetch depth.
    pub fn with_prefetch_pages(mut self, pages: usize) -> Self {
        self.prefetch_pages = pages;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_page_size == 0 {
            return Err("min_page_size must be at least 1".to_string());
        }
        if self.max_page_size < self.min_page_size {
            return Err("max_page_size must not be below min_page_size".to_string());
        }
        if self.default_page_size < self.min_page_size || self.default_page_size > self.max_page_size
        {
            return Err("default_page_size must lie within [min, max]".to_string());
        }
        Ok(())
    }

    /// Resolve a request's page size: non-positive means the default,
    /// then clamp into `[min_page_size, max_page_size]`.
    pub fn clamp_page_size(&self, requested: i64) -> usize {
        let size = if requested <= 0 {
            self.default_page_size
        } else {
            requested as usize
        };
        size.clamp(self.min_page_size, self.max_page_size)
    }

    /// Prefetch depth with the below-one floor applied.
    pub fn effective_prefetch(&self) -> usize {
        self.prefetch_pages.max(1)
    }

    /// Fan-out with the below-one floor applied.
    pub fn effective_workers(&self) -> usize {
        self.worker_count.max(1)
    }
}
