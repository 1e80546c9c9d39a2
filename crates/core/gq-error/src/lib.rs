//! Error types and classification for gridquery.
//!
//! This crate provides:
//! - [`GqError`] - Top-level error enum for all query-path errors
//! - [`ErrorClass`] for HTTP status mapping decisions
//! - Classification logic based on error variant

use thiserror::Error;

/// Top-level error type for gridquery.
#[derive(Error, Debug)]
pub enum GqError {
    /// Pattern syntax errors (bad dialect tokens, duplicate captures, ...)
    #[error("invalid pattern: {0}")]
    Pattern(String),

    /// Request validation errors (empty pattern, unsupported mode)
    #[error("{0}")]
    InvalidRequest(String),

    /// Cursor that failed base64 or JSON decoding
    #[error("invalid cursor")]
    InvalidCursor,

    /// Cursor whose binding triple disagrees with the live request
    #[error("cursor does not match current pattern")]
    CursorMismatch,

    /// Listing-backend failures (transport, non-2xx storage responses,
    /// undecodable payloads)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Planner invariant violations; a bug, not a user or backend problem
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error classification for HTTP status mapping.
///
/// Used by the gateway to decide between 400 and 500 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is at fault; surfaces as HTTP 400.
    Client,

    /// The storage backend failed; surfaces as HTTP 500.
    Backend,

    /// An internal invariant broke; surfaces as HTTP 500.
    Internal,
}

/// Classifies an error for HTTP status mapping.
pub fn classify(error: &GqError) -> ErrorClass {
    match error {
        GqError::Pattern(_)
        | GqError::InvalidRequest(_)
        | GqError::InvalidCursor
        | GqError::CursorMismatch => ErrorClass::Client,
        GqError::Backend(_) => ErrorClass::Backend,
        GqError::Internal(_) => ErrorClass::Internal,
    }
}

impl GqError {
    /// Reports whether the error results from invalid user input.
    pub fn is_client_error(&self) -> bool {
        classify(self) == ErrorClass::Client
    }
}

/// Result type alias using GqError.
pub type Result<T> = std::result::Result<T, GqError>;
