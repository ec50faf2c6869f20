// src/error.rs

use thiserror::Error;

/// Result type for sales-pivot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the library.
///
/// Data-level anomalies (a record with a bad date) never show up here: they
/// are skipped and counted by the aggregation. Only caller mistakes and I/O
/// failures propagate.
#[derive(Debug, Error)]
pub enum Error {
    /// An option name outside its fixed enumeration.
    #[error("invalid {kind} '{value}' (expected one of: {expected})")]
    InvalidOption {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A date supplied by the caller (e.g. a filter bound) that does not parse.
    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
