//! The tagged unit of pending listing work.

use serde::{Deserialize, Serialize};

/// A pending step of a query's traversal.
///
/// Jobs are plain value records owned exclusively by the executor's
/// queue; a job is consumed exactly once and may re-emit itself with a
/// page token plus successor jobs at deeper segments. The serialized
/// form rides inside cursors, so field names are part of the wire
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ListJob {
    /// Delimiter listing at segment `segment_index`: filter common
    /// prefixes by the segment regex and fan out below.
    #[serde(rename_all = "camelCase")]
    Segment {
        segment_index: i32,
        prefix: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page_token: Option<String>,
    },

    /// Flat object enumeration at the terminal segment;
    /// `segment_index == -1` when the pattern has no segment plan.
    #[serde(rename_all = "camelCase")]
    Objects {
        segment_index: i32,
        prefix: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page_token: Option<String>,
    },
}

impl ListJob {
    /// A fresh segment job with no page token.
    pub fn segment(segment_index: i32, prefix: impl Into<String>) -> Self {
        ListJob::Segment {
            segment_index,
            prefix: prefix.into(),
            page_token: None,
        }
    }

    /// A fresh objects job with no page token.
    pub fn objects(segment_index: i32, prefix: impl Into<String>) -> Self {
        ListJob::Objects {
            segment_index,
            prefix: prefix.into(),
            page_token: None,
        }
    }

    /// The same job resumed at a later backend page.
    pub fn resumed(&self, token: impl Into<String>) -> Self {
        let mut job = self.clone();
        match &mut job {
            ListJob::Segment { page_token, .. } | ListJob::Objects { page_token, .. } => {
                *page_token = Some(token.into());
            }
        }
        job
    }

    /// Whether this is an object-enumeration job (the only kind that
    /// consumes page budget).
    pub fn is_objects(&self) -> bool {
        matches!(self, ListJob::Objects { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape_matches_cursor_wire_format() {
        let job = ListJob::segment(0, "root");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "segment", "segmentIndex": 0, "prefix": "root"})
        );

        let job = ListJob::objects(-1, "root").resumed("tok");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "objects",
                "segmentIndex": -1,
                "prefix": "root",
                "pageToken": "tok"
            })
        );
    }

    #[test]
    fn test_round_trip() {
        let job = ListJob::objects(2, "root/a").resumed("t-9");
        let json = serde_json::to_string(&job).unwrap();
        let back: ListJob = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = serde_json::from_str::<ListJob>(r#"{"kind":"mystery","prefix":""}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_is_objects() {
        assert!(ListJob::objects(-1, "").is_objects());
        assert!(!ListJob::segment(0, "").is_objects());
    }
}
