//! The decoded representation of one structured log line.
//!
//! Log producers emit one JSON object per line with short wire keys (`t`, `l`,
//! `mt`, ...). [`LogRecord`] maps those keys onto descriptive field names and adds
//! the decoder-assigned bookkeeping: the 1-based sequence number, the raw line
//! text, the source file stem and a display summary.
//!
//! Field access for search purposes goes through a fixed ordered table of
//! `(wire name, accessor)` pairs instead of runtime reflection, so the engine can
//! evaluate `$any=` clauses and free-text search by plain iteration.

use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

/// Wire name that matches a clause against every searchable field.
pub const ANY_FIELD: &str = "any";

/// Wire names of every searchable field, in evaluation order.
pub const SEARCHABLE_FIELDS: &[&str] = &[
    "t", "l", "pid", "tab", "mt", "tr", "bn", "bv", "lg", "v", "un", "tn", "args", "cust", "ex",
    "span",
];

/// One decoded log line.
///
/// The `Option<Value>` fields carry opaque JSON payloads (objects, arrays or
/// strings depending on the producer); everything else is plain text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    /// 1-based sequence number assigned by the decoder. Unique only within one
    /// file; continues across incremental re-scans of a growing file.
    #[serde(skip)]
    pub seq: u64,

    /// Lexically sortable ISO-like timestamp (`t`).
    #[serde(rename = "t")]
    pub timestamp: Option<String>,
    /// Log level (`l`).
    #[serde(rename = "l")]
    pub level: Option<String>,
    /// Message text (`mt`).
    #[serde(rename = "mt")]
    pub message: Option<String>,
    /// Exception info (`ex`).
    #[serde(rename = "ex")]
    pub exception: Option<Value>,
    /// Free-form custom payload (`cust`).
    #[serde(rename = "cust")]
    pub custom: Option<Value>,
    /// Trace span info (`span`).
    #[serde(rename = "span")]
    pub span: Option<Value>,
    /// Message arguments (`args`).
    #[serde(rename = "args")]
    pub arguments: Option<Value>,
    /// Process id (`pid`).
    #[serde(rename = "pid")]
    pub process_id: Option<String>,
    /// Browser tab id (`tab`).
    #[serde(rename = "tab")]
    pub tab_id: Option<String>,
    /// Trace info (`tr`).
    #[serde(rename = "tr")]
    pub trace: Option<String>,
    /// Browser name (`bn`).
    #[serde(rename = "bn")]
    pub browser_name: Option<String>,
    /// Browser version (`bv`).
    #[serde(rename = "bv")]
    pub browser_version: Option<String>,
    /// Logger name (`lg`).
    #[serde(rename = "lg")]
    pub logger: Option<String>,
    /// User account name (`un`).
    #[serde(rename = "un")]
    pub user_name: Option<String>,
    /// Tenant / system code (`tn`).
    #[serde(rename = "tn")]
    pub tenant: Option<String>,
    /// Producer version (`v`).
    #[serde(rename = "v")]
    pub version: Option<String>,

    /// Display summary: first non-empty of message, exception, custom payload,
    /// span info, arguments. Assigned by the decoder.
    #[serde(skip)]
    pub summary: Option<String>,
    /// Original raw line text.
    #[serde(skip)]
    pub raw_line: Option<String>,
    /// Base name of the originating file, without extension.
    #[serde(skip)]
    pub file_name: Option<String>,
}

impl LogRecord {
    /// The identity pair used for equality and deduplication. Sequence numbers
    /// are only unique within one file, so the file stem is part of the key.
    pub fn identity(&self) -> (Option<&str>, u64) {
        (self.file_name.as_deref(), self.seq)
    }

    /// Text form of the searchable field with the given wire name, or `None`
    /// when the field is absent (or the name is not a known field).
    ///
    /// Opaque JSON payloads render as their string content when they are JSON
    /// strings and as compact JSON otherwise, matching what free-text search
    /// and field clauses are expected to see.
    pub fn field_text(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "t" => self.timestamp.as_deref().map(Cow::Borrowed),
            "l" => self.level.as_deref().map(Cow::Borrowed),
            "pid" => self.process_id.as_deref().map(Cow::Borrowed),
            "tab" => self.tab_id.as_deref().map(Cow::Borrowed),
            "mt" => self.message.as_deref().map(Cow::Borrowed),
            "tr" => self.trace.as_deref().map(Cow::Borrowed),
            "bn" => self.browser_name.as_deref().map(Cow::Borrowed),
            "bv" => self.browser_version.as_deref().map(Cow::Borrowed),
            "lg" => self.logger.as_deref().map(Cow::Borrowed),
            "v" => self.version.as_deref().map(Cow::Borrowed),
            "un" => self.user_name.as_deref().map(Cow::Borrowed),
            "tn" => self.tenant.as_deref().map(Cow::Borrowed),
            "args" => value_text(self.arguments.as_ref()),
            "cust" => value_text(self.custom.as_ref()),
            "ex" => value_text(self.exception.as_ref()),
            "span" => value_text(self.span.as_ref()),
            _ => None,
        }
    }

    /// Iterate every searchable field as `(wire name, text)` in table order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Option<Cow<'_, str>>)> {
        SEARCHABLE_FIELDS
            .iter()
            .map(move |name| (*name, self.field_text(name)))
    }

    /// Case-insensitive substring search across every searchable field.
    pub fn any_field_contains(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        let needle = needle.to_lowercase();
        self.fields().any(|(_, text)| match text {
            Some(text) => text.to_lowercase().contains(&needle),
            None => false,
        })
    }
}

fn value_text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

// Identity equality: two records are the same record iff they come from the
// same file and carry the same sequence number.
impl PartialEq for LogRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for LogRecord {}
