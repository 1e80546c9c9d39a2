//! The opaque resume-token codec.
//!
//! A cursor is the JSON serialization of [`CursorState`] in standard,
//! padded base64. It is self-contained: the pattern identity it was
//! minted for, the residual job queue in order, and the running
//! statistics. Nothing is stored server-side.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use gq_error::{GqError, Result};
use gq_pattern::{CompiledPattern, Mode};
use serde::{Deserialize, Serialize};

use crate::{ListJob, QueryStats};

/// Everything needed to resume an interrupted enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    /// The raw pattern the cursor was minted for.
    pub pattern: String,
    /// Dialect the pattern was compiled under.
    pub mode: Mode,
    /// Bucket the walk runs against.
    pub bucket: String,
    /// Residual job queue, front first.
    pub jobs: Vec<ListJob>,
    /// Counters accumulated so far.
    pub stats: QueryStats,
}

impl CursorState {
    /// Whether the binding triple matches a freshly compiled pattern.
    pub fn binds_to(&self, pattern: &CompiledPattern) -> bool {
        self.pattern == pattern.raw && self.mode == pattern.mode && self.bucket == pattern.bucket
    }
}

/// Serialize a state into an opaque token.
pub fn encode(state: &CursorState) -> Result<String> {
    let payload = serde_json::to_vec(state)
        .map_err(|e| GqError::Internal(format!("encode cursor: {e}")))?;
    Ok(BASE64_STANDARD.encode(payload))
}

/// Decode a token back into a state. Any malformed input is a client
/// error; the binding check is the caller's.
pub fn decode(encoded: &str) -> Result<CursorState> {
    let payload = BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| GqError::InvalidCursor)?;
    serde_json::from_slice(&payload).map_err(|_| GqError::InvalidCursor)
}
