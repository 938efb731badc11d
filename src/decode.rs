//! Decoding of raw log lines into [`LogRecord`]s.
//!
//! Two collaborators live here:
//!
//! - [`LineDecoder`] turns one JSON line into a record, assigning monotonic
//!   1-based sequence numbers and attaching the raw line, the source file stem
//!   and the display summary.
//! - [`FileScanner`] materializes a whole file and supports incremental
//!   re-scans: when the same path has grown since the last scan, only the new
//!   bytes are decoded and sequence numbers continue from the previous count.

use crate::error::{LoggrindError, Result};
use crate::record::LogRecord;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Stateful decoder for one logical sequence of log lines.
///
/// Sequence numbers are only meaningful within one file, so a decoder is
/// created per scan (or seeded with the previous count for incremental ones).
#[derive(Debug)]
pub struct LineDecoder {
    file_stem: Option<String>,
    counter: u64,
    position: u64,
}

impl LineDecoder {
    /// Decoder for a record stream not backed by a file.
    pub fn new() -> Self {
        Self {
            file_stem: None,
            counter: 0,
            position: 0,
        }
    }

    /// Decoder for lines read from `path`, starting sequence numbers after
    /// `previous_records` and physical line positions after `previous_lines`
    /// (both 0 for a fresh scan; they diverge when the file has blank lines).
    pub fn for_file(path: &Path, previous_records: u64, previous_lines: u64) -> Self {
        Self {
            file_stem: file_stem(path),
            counter: previous_records,
            position: previous_lines,
        }
    }

    /// Number of records decoded so far (including any seeded previous count).
    pub fn count(&self) -> u64 {
        self.counter
    }

    /// Number of physical lines seen so far, blank lines included.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Decode one line. Blank lines yield `Ok(None)` and do not consume a
    /// sequence number; malformed JSON fails with the 1-based physical line
    /// position (blank lines count toward it).
    pub fn decode(&mut self, line: &str) -> Result<Option<LogRecord>> {
        self.position += 1;
        if line.trim().is_empty() {
            return Ok(None);
        }

        let mut record: LogRecord = serde_json::from_str(line)
            .map_err(|source| LoggrindError::decode_failure(self.position, source))?;

        self.counter += 1;
        record.seq = self.counter;
        record.raw_line = Some(line.to_string());
        record.file_name = self.file_stem.clone();
        record.summary = summarize(&record);

        Ok(Some(record))
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Display summary: the message when present, otherwise the first non-empty
/// opaque payload prefixed with its wire key.
fn summarize(record: &LogRecord) -> Option<String> {
    if let Some(message) = record.message.as_deref() {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }
    for key in ["ex", "cust", "span", "args"] {
        if let Some(text) = record.field_text(key) {
            return Some(format!("{key}: {text}"));
        }
    }
    None
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Materializes log files into record lists with resume-from-last-size
/// semantics for files that grow between scans.
#[derive(Debug, Default)]
pub struct FileScanner {
    tracked_path: Option<std::path::PathBuf>,
    file_size: u64,
    record_count: u64,
    line_count: u64,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `path` into records.
    ///
    /// Re-scanning the path seen by the previous call reads only the bytes
    /// appended since then, continuing sequence numbers from the last count; a
    /// file that shrank (rotated) or did not grow yields no records. A new
    /// path resets the tracking state and scans from the top.
    pub fn scan(&mut self, path: &Path) -> Result<Vec<LogRecord>> {
        let same_file = self.tracked_path.as_deref() == Some(path);
        let file = File::open(path)
            .map_err(|e| LoggrindError::file_error(format!("Cannot open {}", path.display()), e))?;
        let total_size = file.metadata()?.len();

        let mut reader = BufReader::new(file);
        let mut previous_records = 0;
        let mut previous_lines = 0;

        if same_file {
            if total_size <= self.file_size {
                debug!(
                    "{} did not grow ({} -> {} bytes), nothing to scan",
                    path.display(),
                    self.file_size,
                    total_size
                );
                self.file_size = total_size;
                return Ok(Vec::new());
            }
            reader.seek(SeekFrom::Start(self.file_size))?;
            previous_records = self.record_count;
            previous_lines = self.line_count;
        }

        let mut decoder = LineDecoder::for_file(path, previous_records, previous_lines);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if let Some(record) = decoder.decode(&line)? {
                records.push(record);
            }
        }

        self.tracked_path = Some(path.to_path_buf());
        self.file_size = total_size;
        self.record_count = decoder.count();
        self.line_count = decoder.position();
        debug!(
            "scanned {}: {} new records, {} total records over {} lines",
            path.display(),
            records.len(),
            self.record_count,
            self.line_count
        );

        Ok(records)
    }

    /// Forget the tracked file so the next scan starts from the top.
    pub fn reset(&mut self) {
        self.tracked_path = None;
        self.file_size = 0;
        self.record_count = 0;
        self.line_count = 0;
    }
}
