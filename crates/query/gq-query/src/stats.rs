//! Query statistics.

use serde::{Deserialize, Serialize};

/// Counters collected while executing a query.
///
/// Merges are commutative integer adds, so the concurrent batch merge
/// is order-insensitive, and the counters survive cursor round-trips
/// unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryStats {
    /// Common prefixes returned by delimiter listings, counted before
    /// segment-regex filtering.
    pub scanned_prefixes: u64,

    /// Objects examined against the full matcher.
    pub scanned_objects: u64,

    /// Objects that matched; equals the total items emitted across a
    /// paginated walk.
    pub matched: u64,
}

impl QueryStats {
    /// Add another stats delta into this one.
    pub fn merge(&mut self, other: &QueryStats) {
        self.scanned_prefixes += other.scanned_prefixes;
        self.scanned_objects += other.scanned_objects;
        self.matched += other.matched;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accumulates() {
        let mut stats = QueryStats::default();
        stats.merge(&QueryStats {
            scanned_prefixes: 2,
            scanned_objects: 10,
            matched: 3,
        });
        stats.merge(&QueryStats {
            scanned_prefixes: 1,
            scanned_objects: 5,
            matched: 0,
        });

        assert_eq!(stats.scanned_prefixes, 3);
        assert_eq!(stats.scanned_objects, 15);
        assert_eq!(stats.matched, 3);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(QueryStats {
            scanned_prefixes: 1,
            scanned_objects: 2,
            matched: 3,
        })
        .unwrap();
        assert_eq!(json["scannedPrefixes"], 1);
        assert_eq!(json["scannedObjects"], 2);
        assert_eq!(json["matched"], 3);
    }
}
