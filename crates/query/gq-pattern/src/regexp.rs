//! Regex-dialect parsing.
//!
//! The object-path portion is taken as a user-supplied regular
//! expression. Both `(?<name>...)` and `(?P<name>...)` named-capture
//! spellings are accepted; the matcher is anchored over the full object
//! name. No per-segment plan is produced: the executor runs one flat
//! listing under the extracted literal prefix.

use gq_error::{GqError, Result};
use regex::Regex;

use crate::{split_gs_url, CompiledPattern, Mode};

/// Regex metacharacters that terminate the literal-prefix scan.
const META_CHARS: &str = ".*+?[](){}|$^";

pub(crate) fn parse(raw: &str) -> Result<CompiledPattern> {
    let (bucket, object_pattern) = split_gs_url(raw)?;

    let normalized = normalize_capture_groups(&object_pattern);
    let anchored = ensure_anchored(&normalized);
    let matcher =
        Regex::new(&anchored).map_err(|e| GqError::Pattern(format!("compile regex: {e}")))?;

    let capture_names = collect_capture_names(&matcher);
    let literal_prefix = literal_prefix(&normalized);

    Ok(CompiledPattern {
        raw: raw.to_string(),
        mode: Mode::Regex,
        bucket,
        object_pattern,
        segments: Vec::new(),
        capture_names,
        matcher,
        literal_prefix,
    })
}

/// Rewrite `(?<name>` to the `(?P<name>` spelling.
fn normalize_capture_groups(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '(' && i + 2 < chars.len() && chars[i + 1] == '?' && chars[i + 2] == '<' {
            out.push_str("(?P<");
            i += 3;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Anchor the pattern with `^` and `$`, stripping any existing anchors
/// first so they are never doubled.
fn ensure_anchored(pattern: &str) -> String {
    let trimmed = pattern.strip_prefix('^').unwrap_or(pattern);
    let trimmed = trimmed.strip_suffix('$').unwrap_or(trimmed);
    format!("^{trimmed}$")
}

/// Extract the leading run of literal characters.
///
/// `\` escapes exactly one character, which is taken literally; the scan
/// stops at the first unescaped metacharacter.
fn literal_prefix(pattern: &str) -> String {
    let trimmed = pattern.strip_prefix('^').unwrap_or(pattern);
    let trimmed = trimmed.strip_suffix('$').unwrap_or(trimmed);

    let mut prefix = String::new();
    let mut escaped = false;
    for ch in trimmed.chars() {
        if escaped {
            prefix.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if META_CHARS.contains(ch) {
            break;
        }
        prefix.push(ch);
    }
    prefix
}

/// Named groups in index order, deduplicated preserving first occurrence.
fn collect_capture_names(matcher: &Regex) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in matcher.capture_names().flatten() {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}
