//! End-to-end tests for gridquery.
//!
//! These drive the real router over the in-memory listing backend, so
//! every layer short of the Cloud Storage transport is exercised: the
//! gateway's validation and status mapping, the executor's planning and
//! fan-out, cursor round-trips, and capture extraction.
//!
//! Run with:
//! ```bash
//! cargo test -p gq-integration-tests
//! ```

mod common;
mod count_test;
mod query_test;
