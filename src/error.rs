//! Error types and handling infrastructure for loggrind.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types; the binary wraps these with `anyhow` for top-level context.
//!
//! Cancellation is deliberately not represented here: a cancelled scan still
//! carries its partial results and is modeled as
//! [`SearchStatus::Cancelled`](crate::search::SearchStatus), not as an error.

use thiserror::Error;

/// The main error type for loggrind operations.
#[derive(Error, Debug)]
pub enum LoggrindError {
    /// Query string does not match the clause grammar. User-correctable;
    /// reported verbatim to the caller, never retried.
    #[error("Malformed query: {message}")]
    MalformedQuery { message: String },

    /// Odd number of double-quote characters in the query string.
    #[error("Query contains an unescaped double quote")]
    UnescapedQuote,

    /// Wildcard transpilation produced no usable pattern.
    #[error("Search term produced an empty pattern")]
    EmptyPattern,

    /// A reserved numeric control value (`lns`, `lne`, `lcb`, `lca`) failed to
    /// parse as an integer.
    #[error("Invalid value for ${name}: {value:?} is not a number")]
    InvalidRangeValue { name: String, value: String },

    /// A log line could not be decoded into a record.
    #[error("Failed to decode log line {line}: {source}")]
    DecodeFailure {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    /// File system related errors (file not found, permission denied, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Standard Result type for loggrind operations.
pub type Result<T> = std::result::Result<T, LoggrindError>;

impl LoggrindError {
    /// Create a MalformedQuery error with a descriptive message
    pub fn malformed_query(message: impl Into<String>) -> Self {
        Self::MalformedQuery {
            message: message.into(),
        }
    }

    /// Create an InvalidRangeValue error for a reserved control name
    pub fn invalid_range_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidRangeValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a DecodeFailure carrying the 1-based line number
    pub fn decode_failure(line: u64, source: serde_json::Error) -> Self {
        Self::DecodeFailure { line, source }
    }

    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversion from io::Error to LoggrindError
impl From<std::io::Error> for LoggrindError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found",
            std::io::ErrorKind::PermissionDenied => "Permission denied",
            _ => "IO operation failed",
        };
        Self::FileError {
            message: message.to_string(),
            source: err,
        }
    }
}
