//! Result buckets for one search run.

use crate::record::LogRecord;
use std::collections::HashSet;
use std::fmt;

/// Result of one search run.
///
/// Both lists start empty, are appended to only during the forward scan, and
/// are finalized (context deduplicated) when the scan ends or is cancelled.
/// The metadata fields are stamped by the caller, not by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Records that satisfied the query directly, in scan order.
    pub exact_matches: Vec<LogRecord>,
    /// Every exact match plus its retained neighbors, in scan order,
    /// duplicate-free after finalization.
    pub with_context: Vec<LogRecord>,
    /// The search line this outcome answers.
    pub query_label: String,
    /// Base name of the searched file.
    pub file_name: String,
    /// Full path of the searched file.
    pub file_path: String,
}

impl SearchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop duplicate context entries (overlapping windows from closely spaced
    /// matches double-insert records), keeping first occurrences in scan order.
    pub fn dedup_context(&mut self) {
        let mut seen: HashSet<(Option<String>, u64)> = HashSet::new();
        self.with_context
            .retain(|record| seen.insert((record.file_name.clone(), record.seq)));
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} results",
            self.query_label,
            self.file_name,
            self.exact_matches.len()
        )
    }
}

/// How a search run ended.
///
/// Cancellation is a first-class variant rather than an error so the partial
/// outcome stays retrievable without any downcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// The scan consumed the whole record sequence.
    Completed(SearchOutcome),
    /// The scan was cancelled mid-way; the outcome holds everything
    /// accumulated up to the cancellation point, trailing context included.
    Cancelled(SearchOutcome),
}

impl SearchStatus {
    pub fn outcome(&self) -> &SearchOutcome {
        match self {
            Self::Completed(outcome) | Self::Cancelled(outcome) => outcome,
        }
    }

    pub fn outcome_mut(&mut self) -> &mut SearchOutcome {
        match self {
            Self::Completed(outcome) | Self::Cancelled(outcome) => outcome,
        }
    }

    pub fn into_outcome(self) -> SearchOutcome {
        match self {
            Self::Completed(outcome) | Self::Cancelled(outcome) => outcome,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}
