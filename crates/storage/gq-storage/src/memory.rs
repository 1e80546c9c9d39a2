//! In-memory listing backend for tests and local development.
//!
//! Holds an immutable, sorted set of object names and reproduces the
//! JSON API's listing contract: lexicographic order, delimiter grouping
//! into common prefixes, and combined-count pagination. Page tokens are
//! offsets into the entry sequence, which is stable because the name set
//! never changes.

use async_trait::async_trait;
use gq_error::{GqError, Result};

use crate::backend::{ListPage, ListRequest, ListingBackend, ObjectEntry};

/// Page cap applied when the request leaves `page_size` at zero.
const DEFAULT_PAGE_CAP: usize = 1000;

/// Deterministic in-memory [`ListingBackend`].
///
/// The backend is bucket-agnostic: any non-empty bucket name lists the
/// same namespace, which keeps fixtures small.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    names: Vec<String>,
}

enum Entry {
    Object(String),
    Prefix(String),
}

impl MemoryBackend {
    /// Create a backend holding the given object names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Number of objects held.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the backend holds no objects.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The full entry sequence for a prefix/delimiter combination.
    ///
    /// Adjacent names sharing a common prefix collapse into one prefix
    /// entry, mirroring delimiter-grouped listings.
    fn entries(&self, prefix: &str, delimiter: &str) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut last_common: Option<String> = None;

        for name in self.names.iter().filter(|n| n.starts_with(prefix)) {
            if !delimiter.is_empty() {
                if let Some(pos) = name[prefix.len()..].find(delimiter) {
                    let common = name[..prefix.len() + pos + delimiter.len()].to_string();
                    if last_common.as_deref() != Some(common.as_str()) {
                        last_common = Some(common.clone());
                        entries.push(Entry::Prefix(common));
                    }
                    continue;
                }
            }
            entries.push(Entry::Object(name.clone()));
        }

        entries
    }
}

#[async_trait]
impl ListingBackend for MemoryBackend {
    async fn list(&self, request: ListRequest) -> Result<ListPage> {
        if request.bucket.is_empty() {
            return Err(GqError::Backend("bucket is required".to_string()));
        }

        let entries = self.entries(&request.prefix, &request.delimiter);

        let offset = match &request.page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| GqError::Backend(format!("invalid page token: {token}")))?,
            None => 0,
        };
        let cap = if request.page_size == 0 {
            DEFAULT_PAGE_CAP
        } else {
            request.page_size
        };
        let end = entries.len().min(offset.saturating_add(cap));

        let mut page = ListPage::default();
        for entry in &entries[offset.min(entries.len())..end] {
            match entry {
                Entry::Object(name) => page.objects.push(ObjectEntry { name: name.clone() }),
                Entry::Prefix(common) => page.prefixes.push(common.clone()),
            }
        }
        if end < entries.len() {
            page.next_page_token = Some(end.to_string());
        }

        Ok(page)
    }
}
