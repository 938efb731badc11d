//! Before/after context windows around matches.
//!
//! The engine feeds every scanned record through [`ContextWindows::observe`];
//! the manager keeps a bounded FIFO of potential "before" neighbors, collects
//! an "after" window once a match fires, and merges windows of closely spaced
//! matches. Records land in the outcome's context list in scan order; the
//! final dedup pass removes double-insertions from overlapping windows.

use crate::query::Query;
use crate::record::LogRecord;
use crate::search::outcome::SearchOutcome;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct ContextWindows {
    before: VecDeque<LogRecord>,
    after: VecDeque<LogRecord>,
    before_capacity: usize,
    after_capacity: usize,
    collecting_after: bool,
}

impl ContextWindows {
    pub fn new(query: &Query) -> Self {
        Self {
            before: VecDeque::with_capacity(query.context_before),
            after: VecDeque::with_capacity(query.context_after + 1),
            before_capacity: query.context_before,
            after_capacity: query.context_after,
            collecting_after: false,
        }
    }

    /// Fold one scanned record into the outcome.
    pub fn observe(&mut self, record: &LogRecord, matched: bool, outcome: &mut SearchOutcome) {
        // Non-matches are candidate "before" neighbors; the oldest falls out
        // once the window is full.
        if !matched && self.before_capacity > 0 {
            self.before.push_back(record.clone());
            if self.before.len() > self.before_capacity {
                self.before.pop_front();
            }
        }

        if matched {
            if self.before_capacity > 0 {
                outcome.with_context.extend(self.before.drain(..));
            }

            outcome.with_context.push(record.clone());
            outcome.exact_matches.push(record.clone());

            // A match inside a still-open "after" window merges that window
            // immediately; otherwise it opens a new one.
            if self.collecting_after && !self.after.is_empty() {
                outcome.with_context.extend(self.after.drain(..));
            } else {
                self.collecting_after = true;
            }
        }

        if self.collecting_after {
            self.after.push_back(record.clone());
            if self.after.len() > self.after_capacity {
                outcome.with_context.extend(self.after.drain(..));
                self.collecting_after = false;
            }
        }
    }

    /// End-of-scan flush (also runs on cancellation): an "after" window still
    /// filling up is emitted as-is, then the context list is deduplicated.
    pub fn finish(&mut self, outcome: &mut SearchOutcome) {
        if self.after_capacity > 0 && !self.after.is_empty() {
            outcome.with_context.extend(self.after.drain(..));
        }
        outcome.dedup_context();
    }
}
