//! JSON serialization for suite results.
//!
//! Unbounded margins of error (fewer than two samples) serialize as `null`.

use serde::Serialize;

/// Serialize a report, outcome, or event to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for the crate's report types).
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Serialize a report, outcome, or event to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for the crate's report types).
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
