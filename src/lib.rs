//! # loggrind - Structured Log Search
//!
//! A search core and CLI for structured (JSON-per-line) log files: a small
//! query language compiles into structured predicates, and a streaming engine
//! evaluates them against decoded records while collecting context lines
//! around each match.
//!
//! ## Features
//!
//! - **Query language**: `$name="value"` clauses with `*` wildcards, OR-ed
//!   repeated attributes, exclusions, line/date ranges and context controls
//! - **Context windows**: N-before/M-after neighbor collection with merging of
//!   overlapping windows
//! - **Cooperative cancellation**: a cancelled scan still returns everything
//!   found so far
//! - **Incremental decoding**: growing files re-scan only their new bytes
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`record`] - The decoded log line data model
//! - [`decode`] - JSON line decoder and incremental file scanner
//! - [`query`] - Query model, compiler and wildcard transpiler
//! - [`search`] - Streaming search engine, context windows and async worker
//! - [`detail`] - Human-readable single-record rendering

pub mod decode;
pub mod detail;
pub mod error;
pub mod query;
pub mod record;
pub mod search;

// Re-export commonly used types for convenience
pub use error::{LoggrindError, Result};

pub use decode::{FileScanner, LineDecoder};
pub use query::Query;
pub use record::LogRecord;
pub use search::{SearchEngine, SearchOutcome, SearchStatus};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
