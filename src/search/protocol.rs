//! Protocol definitions shared between a coordinator and the search worker.

use crate::error::LoggrindError;
use crate::query::Query;
use crate::record::LogRecord;
use crate::search::outcome::SearchStatus;
use std::path::PathBuf;

/// Identifier attached to cross-thread requests so responses can be correlated.
pub type RequestId = u64;

/// Where the records for one search come from.
#[derive(Debug, Clone)]
pub enum SearchSource {
    /// Records already materialized from a previously opened file.
    Records(Vec<LogRecord>),
    /// A file to decode record-by-record during the scan.
    File(PathBuf),
}

/// Commands sent from the coordinator to the search worker.
#[derive(Debug)]
pub enum SearchCommand {
    /// Run one scan; the worker replies with `Finished` or `Error`.
    ExecuteSearch {
        request_id: RequestId,
        source: SearchSource,
        query: Query,
        /// Stamped onto the outcome as its query label.
        label: String,
    },
    /// Cancel the scan currently in flight (if any). The scan still delivers
    /// its partial outcome as a cancelled `Finished` response.
    CancelSearch,
    Shutdown,
}

/// Responses emitted by the search worker back to the coordinator.
#[derive(Debug)]
pub enum SearchResponse {
    /// The scan ended, either complete or cancelled-with-partial-result.
    Finished {
        request_id: RequestId,
        status: SearchStatus,
    },
    Error {
        request_id: RequestId,
        error: LoggrindError,
    },
}
