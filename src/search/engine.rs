//! The streaming search engine.
//!
//! One forward scan per invocation: records arrive either from an in-memory
//! iterator or decoded line-by-line from a file, and both paths produce the
//! same outcome for the same logical record sequence. The scan checks the
//! cancellation token once per record; a cancelled scan still flushes its
//! trailing context window and returns the partial outcome as
//! [`SearchStatus::Cancelled`].

use crate::decode::LineDecoder;
use crate::error::Result;
use crate::query::{FieldClause, Query};
use crate::record::{LogRecord, ANY_FIELD};
use crate::search::context::ContextWindows;
use crate::search::outcome::{SearchOutcome, SearchStatus};
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Outcome of the range pre-filter for one record.
enum RangeCheck {
    /// A set bound is violated; the record cannot match.
    Outside,
    /// All set bounds hold and the query tests nothing else; being in range
    /// is itself the match condition.
    Sufficient,
    /// Keep evaluating the remaining clauses.
    Continue,
}

/// Evaluates a [`Query`] against a sequence of records.
#[derive(Debug, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Search an in-memory record sequence.
    pub fn search_records<I>(
        &self,
        records: I,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<SearchStatus>
    where
        I: IntoIterator<Item = LogRecord>,
    {
        let mut outcome = SearchOutcome::new();
        let mut windows = ContextWindows::new(query);

        for record in records {
            if cancel.is_cancelled() {
                return Ok(finish_cancelled(windows, outcome));
            }
            let matched = self.evaluate(&record, query);
            windows.observe(&record, matched, &mut outcome);
        }

        windows.finish(&mut outcome);
        Ok(SearchStatus::Completed(outcome))
    }

    /// Search a file, decoding each line into a record on the fly (sequence
    /// numbers from 1). The file handle lives exactly as long as the scan.
    ///
    /// A malformed line aborts the scan with a decode failure, except that a
    /// cancellation observed on the same iteration takes precedence.
    pub fn search_file(
        &self,
        path: &Path,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<SearchStatus> {
        let mut outcome = SearchOutcome::new();
        let mut windows = ContextWindows::new(query);
        let mut decoder = LineDecoder::for_file(path, 0, 0);

        let file = File::open(path).map_err(|e| {
            crate::error::LoggrindError::file_error(format!("Cannot open {}", path.display()), e)
        })?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            if cancel.is_cancelled() {
                return Ok(finish_cancelled(windows, outcome));
            }

            let line = line?;
            let Some(record) = decoder.decode(&line)? else {
                continue;
            };
            let matched = self.evaluate(&record, query);
            windows.observe(&record, matched, &mut outcome);
        }

        debug!(
            "scanned {} records from {}: {} matches",
            decoder.count(),
            path.display(),
            outcome.exact_matches.len()
        );
        windows.finish(&mut outcome);
        Ok(SearchStatus::Completed(outcome))
    }

    /// Decide whether one record satisfies the query.
    fn evaluate(&self, record: &LogRecord, query: &Query) -> bool {
        // Exclusion fires only for free-text style queries; structured field
        // clauses express exclusions themselves via `=-`.
        if query.field_clauses.is_empty() {
            if let Some(exclude) = query.exclude_text.as_deref() {
                if record.any_field_contains(exclude) {
                    return false;
                }
            }
        }

        match self.check_ranges(record, query) {
            RangeCheck::Outside => return false,
            RangeCheck::Sufficient => return true,
            RangeCheck::Continue => {}
        }

        if !query.field_clauses.is_empty() {
            return self.field_clauses_match(record, query);
        }

        match query.free_text.as_deref() {
            Some(text) if !text.is_empty() => record.any_field_contains(text),
            _ => false,
        }
    }

    /// Range pre-filter over sequence number and timestamp.
    fn check_ranges(&self, record: &LogRecord, query: &Query) -> RangeCheck {
        if !query.has_range_bounds() {
            return RangeCheck::Continue;
        }

        let timestamp = record.timestamp.as_deref().unwrap_or("");
        let in_range = query.line_start.map_or(true, |start| record.seq >= start)
            && query.line_end.map_or(true, |end| record.seq <= end)
            && query.date_begin.as_deref().map_or(true, |b| timestamp >= b)
            && query.date_end.as_deref().map_or(true, |e| timestamp <= e);

        if !in_range {
            RangeCheck::Outside
        } else if query.has_match_clauses() {
            RangeCheck::Continue
        } else {
            // A bare range query returns every record inside the range.
            RangeCheck::Sufficient
        }
    }

    /// Every name-group must be satisfied; clauses sharing a name are OR-ed.
    fn field_clauses_match(&self, record: &LogRecord, query: &Query) -> bool {
        let mut evaluated: Vec<&str> = Vec::new();

        for clause in &query.field_clauses {
            if evaluated.contains(&clause.name.as_str()) {
                continue;
            }
            evaluated.push(&clause.name);

            let group = query
                .field_clauses
                .iter()
                .filter(|c| c.name == clause.name);

            let group_passes = if clause.name == ANY_FIELD {
                group
                    .into_iter()
                    .any(|c| record.fields().any(|(_, text)| clause_passes(text.as_deref(), c)))
            } else {
                let text = record.field_text(&clause.name);
                group.into_iter().any(|c| clause_passes(text.as_deref(), c))
            };

            if !group_passes {
                return false;
            }
        }

        true
    }
}

/// One `(field, include, pattern)` test against one field value.
///
/// An absent or empty field passes an excluding clause and fails an including
/// one; a present value must agree with the pattern under the include flag.
fn clause_passes(text: Option<&str>, clause: &FieldClause) -> bool {
    match text {
        None | Some("") => !clause.include,
        Some(value) => clause.include == clause.pattern.is_match(value),
    }
}

fn finish_cancelled(mut windows: ContextWindows, mut outcome: SearchOutcome) -> SearchStatus {
    windows.finish(&mut outcome);
    SearchStatus::Cancelled(outcome)
}
