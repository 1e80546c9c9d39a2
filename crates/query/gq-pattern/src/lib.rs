//! Object-name pattern compiler for gridquery.
//!
//! Patterns address a bucket and an object path, `gs://bucket/path/...`,
//! in one of two dialects:
//!
//! - **percent**: `%name%` captures one path segment component
//!   (`[^/]+`), `%%` is a literal percent sign, everything else is
//!   literal. Compiled per segment so the executor can prune the
//!   delimiter tree level by level.
//! - **regex**: the path portion is a user-supplied regular expression
//!   with `(?<name>...)` or `(?P<name>...)` named captures, anchored and
//!   matched against full object names under a single literal prefix.
//!
//! # Example
//!
//! ```
//! use gq_pattern::{compile, Mode};
//!
//! let cp = compile("gs://photos/raw/%shoot%/img_%idx%.jpg", Mode::Percent).unwrap();
//! assert_eq!(cp.bucket, "photos");
//! assert_eq!(cp.literal_prefix, "raw/");
//! assert_eq!(cp.capture_names, vec!["shoot", "idx"]);
//!
//! let captures = cp.match_object("raw/alps/img_07.jpg").unwrap();
//! assert_eq!(captures["shoot"], "alps");
//! assert_eq!(captures["idx"], "07");
//! ```

use std::collections::HashMap;

use gq_error::{GqError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

mod percent;
mod regexp;

/// Supported pattern dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// `%name%` capture tokens, everything else literal.
    Percent,
    /// User-supplied regular expression over the object path.
    Regex,
}

impl Mode {
    /// Parse a request-supplied mode string. Empty defaults to percent.
    pub fn parse(value: &str) -> Result<Mode> {
        match value {
            "" | "percent" => Ok(Mode::Percent),
            "regex" => Ok(Mode::Regex),
            other => Err(GqError::InvalidRequest(format!(
                "unsupported mode: {other}"
            ))),
        }
    }

    /// The wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Percent => "percent",
            Mode::Regex => "regex",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `/`-separated component of a percent-dialect pattern.
#[derive(Debug, Clone)]
pub struct Segment {
    /// The component exactly as written.
    pub raw: String,
    /// Anchored regex matching one candidate segment value.
    pub regex: Regex,
    /// The unanchored regex source; bodies joined by `/` rebuild the
    /// full matcher.
    pub regex_body: String,
    /// Capture names introduced by this segment, in order.
    pub capture_names: Vec<String>,
    /// Literal text before the first capture; narrows the listing
    /// prefix at this level.
    pub literal_prefix: String,
    /// Whether the segment introduces at least one capture.
    pub has_capture: bool,
}

/// A parsed and compiled object pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The pattern exactly as submitted; cursors bind to it.
    pub raw: String,
    /// Dialect the pattern was compiled under.
    pub mode: Mode,
    /// Bucket extracted from the `gs://bucket/...` prefix.
    pub bucket: String,
    /// Path portion after the bucket.
    pub object_pattern: String,
    /// Per-segment plan; empty in regex mode.
    pub segments: Vec<Segment>,
    /// Capture names in order of appearance, unique across the pattern.
    pub capture_names: Vec<String>,
    /// Anchored matcher over the full object name.
    pub matcher: Regex,
    /// Longest fixed prefix of matching object names; the narrowest
    /// listing root.
    pub literal_prefix: String,
}

impl CompiledPattern {
    /// Match a full object name, returning the capture map on success.
    pub fn match_object(&self, name: &str) -> Option<HashMap<String, String>> {
        let caps = self.matcher.captures(name)?;
        let mut values = HashMap::with_capacity(self.capture_names.len());
        for group in self.matcher.capture_names().flatten() {
            if let Some(m) = caps.name(group) {
                values.insert(group.to_string(), m.as_str().to_string());
            }
        }
        Some(values)
    }
}

/// Compile a raw pattern under the given dialect.
pub fn compile(raw: &str, mode: Mode) -> Result<CompiledPattern> {
    match mode {
        Mode::Percent => percent::parse(raw),
        Mode::Regex => regexp::parse(raw),
    }
}

/// Split `gs://bucket/path` into bucket and object-pattern parts.
///
/// Shared validation for both dialects: the scheme, the bucket/path
/// separator, a non-empty bucket, and a non-empty path are all required.
fn split_gs_url(raw: &str) -> Result<(String, String)> {
    let rest = raw
        .strip_prefix("gs://")
        .ok_or_else(|| GqError::Pattern("pattern must start with gs://".to_string()))?;

    let (bucket, path) = rest.split_once('/').ok_or_else(|| {
        GqError::Pattern("pattern must include bucket and object path".to_string())
    })?;

    if bucket.is_empty() {
        return Err(GqError::Pattern("bucket is required".to_string()));
    }

    let object_pattern = path.trim_start_matches('/');
    if object_pattern.is_empty() {
        return Err(GqError::Pattern("object pattern is required".to_string()));
    }

    Ok((bucket.to_string(), object_pattern.to_string()))
}

/// Check whether a capture name is valid (`[A-Za-z0-9_]+`).
fn is_valid_capture_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
