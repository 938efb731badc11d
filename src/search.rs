//! Streaming search over log records.
//!
//! [`engine`] runs the single-pass scan, [`context`] keeps the before/after
//! neighbor windows, [`outcome`] holds the result buckets, and [`worker`] wraps
//! the engine in a tokio command loop so a UI thread can stay responsive.

pub mod context;
pub mod engine;
pub mod outcome;
pub mod protocol;
pub mod worker;

pub use engine::SearchEngine;
pub use outcome::{SearchOutcome, SearchStatus};
pub use worker::search_worker_loop;
