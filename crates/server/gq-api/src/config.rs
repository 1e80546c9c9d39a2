//! Environment configuration for the gateway.

use std::time::Duration;

use gq_query::config::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_MIN_PAGE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_PREFETCH_PAGES,
    DEFAULT_WORKER_COUNT,
};
use gq_query::QueryConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_BUCKET: &str = "public-sandbox";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Runtime configuration for the gateway process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Default bucket surfaced to clients; informational.
    pub bucket: String,
    /// Timeout applied to each storage-listing HTTP request.
    pub request_timeout: Duration,
    /// Policy handed to the query executor.
    pub query: QueryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: split_and_trim(DEFAULT_ORIGINS),
            bucket: DEFAULT_BUCKET.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            query: QueryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparsable values fall back to their defaults; the page-size
    /// triple is repaired so `min <= default <= max` always holds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = get("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let allowed_origins = split_and_trim(&get("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string()));
        let bucket = get("GCS_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let request_timeout = get("REQUEST_TIMEOUT")
            .and_then(|v| parse_duration(&v))
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let worker_count = get_usize(&get, "WORKER_COUNT", DEFAULT_WORKER_COUNT);
        let mut min_page_size = get_usize(&get, "MIN_PAGE_SIZE", DEFAULT_MIN_PAGE_SIZE);
        let mut max_page_size = get_usize(&get, "MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE);
        let mut default_page_size = get_usize(&get, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let prefetch_pages = get_usize(&get, "PREFETCH_PAGES", DEFAULT_PREFETCH_PAGES);

        if min_page_size < 1 {
            min_page_size = DEFAULT_MIN_PAGE_SIZE;
        }
        if max_page_size < min_page_size {
            max_page_size = DEFAULT_MAX_PAGE_SIZE.max(min_page_size);
        }
        if default_page_size < min_page_size || default_page_size > max_page_size {
            default_page_size = DEFAULT_PAGE_SIZE.clamp(min_page_size, max_page_size);
        }

        let query = QueryConfig::new()
            .with_worker_count(worker_count.max(1))
            .with_page_size_bounds(min_page_size, max_page_size)
            .with_default_page_size(default_page_size)
            .with_prefetch_pages(prefetch_pages);

        Self {
            port,
            allowed_origins,
            bucket,
            request_timeout,
            query,
        }
    }
}

fn get_usize(get: &impl Fn(&str) -> Option<String>, key: &str, fallback: usize) -> usize {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(fallback)
}

/// Split a comma-separated list, trimming entries and dropping empties.
fn split_and_trim(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `15s`, `2m`, `500ms`, `1h`, or a bare number of seconds.
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let digits = value.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let number: u64 = value[..digits].parse().ok()?;
    match &value[digits..] {
        "ms" => Some(Duration::from_millis(number)),
        "s" => Some(Duration::from_secs(number)),
        "m" => Some(Duration::from_secs(number * 60)),
        "h" => Some(Duration::from_secs(number * 3600)),
        _ => None,
    }
}
