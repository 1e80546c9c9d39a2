//! Percent-dialect parsing.
//!
//! `%name%` introduces a capture matching one path component greedily,
//! `%%` escapes a literal percent sign, and every other character is
//! matched literally. Each `/`-separated segment compiles to its own
//! anchored regex so the executor can filter delimiter listings level by
//! level.

use gq_error::{GqError, Result};
use regex::Regex;

use crate::{is_valid_capture_name, split_gs_url, CompiledPattern, Mode, Segment};

pub(crate) fn parse(raw: &str) -> Result<CompiledPattern> {
    let (bucket, object_pattern) = split_gs_url(raw)?;

    let mut segments = Vec::new();
    let mut capture_names: Vec<String> = Vec::new();
    for (index, seg_raw) in object_pattern.split('/').enumerate() {
        let segment = parse_segment(seg_raw)
            .map_err(|e| GqError::Pattern(format!("segment {index}: {e}")))?;
        for name in &segment.capture_names {
            if capture_names.iter().any(|existing| existing == name) {
                return Err(GqError::Pattern(format!("duplicate capture name: {name}")));
            }
            capture_names.push(name.clone());
        }
        segments.push(segment);
    }

    let full_pattern = build_full_regex(&segments);
    let matcher = Regex::new(&full_pattern)
        .map_err(|e| GqError::Pattern(format!("compile full regex: {e}")))?;

    let literal_prefix = build_literal_prefix(&segments);

    Ok(CompiledPattern {
        raw: raw.to_string(),
        mode: Mode::Percent,
        bucket,
        object_pattern,
        segments,
        capture_names,
        matcher,
        literal_prefix,
    })
}

/// Parse one path component into its segment plan.
///
/// The error message carries no segment index; the caller prepends it.
fn parse_segment(raw: &str) -> std::result::Result<Segment, String> {
    let chars: Vec<char> = raw.chars().collect();
    let mut body = String::new();
    let mut literal_prefix = String::new();
    let mut captures: Vec<String> = Vec::new();
    let mut seen_capture = false;

    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '%' {
            if i + 1 < chars.len() && chars[i + 1] == '%' {
                body.push('%');
                if !seen_capture {
                    literal_prefix.push('%');
                }
                i += 2;
                continue;
            }

            let end = chars[i + 1..]
                .iter()
                .position(|&c| c == '%')
                .ok_or_else(|| "unterminated capture token".to_string())?;
            let name: String = chars[i + 1..i + 1 + end].iter().collect();
            if name.is_empty() {
                return Err("empty capture name".to_string());
            }
            if !is_valid_capture_name(&name) {
                return Err(format!("invalid capture name: {name}"));
            }

            body.push_str(&format!("(?P<{name}>[^/]+)"));
            captures.push(name);
            seen_capture = true;
            i += end + 2;
            continue;
        }

        push_escaped(&mut body, chars[i]);
        if !seen_capture {
            literal_prefix.push(chars[i]);
        }
        i += 1;
    }

    let regex = Regex::new(&format!("^{body}$")).map_err(|e| e.to_string())?;

    Ok(Segment {
        raw: raw.to_string(),
        regex,
        regex_body: body,
        has_capture: !captures.is_empty(),
        capture_names: captures,
        literal_prefix,
    })
}

/// Append a single literal character to a regex body, escaped as needed.
fn push_escaped(body: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    body.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

/// Join the segment bodies with `/` under a single pair of anchors.
fn build_full_regex(segments: &[Segment]) -> String {
    let mut pattern = String::from("^");
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            pattern.push('/');
        }
        pattern.push_str(&segment.regex_body);
    }
    pattern.push('$');
    pattern
}

/// Concatenate per-segment literals up to and including the first
/// capture-bearing segment's pre-capture text.
fn build_literal_prefix(segments: &[Segment]) -> String {
    let mut prefix = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            prefix.push('/');
        }
        prefix.push_str(&segment.literal_prefix);
        if segment.has_capture {
            break;
        }
    }
    prefix
}
