//! Compiled search intent and the query-language compiler.
//!
//! A search line either starts with the `$` sentinel and uses the clause
//! grammar, or is treated as a plain free-text term:
//!
//! ```text
//! $name[$name...]=["-"]"value" [$name...=...]
//! ```
//!
//! Multiple names in one clause share the value; a leading `-` turns the clause
//! into an exclusion; repeating a name across clauses ORs the alternatives.
//! Six reserved names control ranges and context sizes instead of matching
//! fields: `lns`/`lne` (sequence-number bounds), `db`/`de` (lexical timestamp
//! bounds), `lcb`/`lca` (context lines before/after).

pub mod pattern;

use crate::error::{LoggrindError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix distinguishing clause-grammar queries from free-text terms.
pub const QUERY_SENTINEL: char = '$';

const RESERVED_DATE_BEGIN: &str = "db";
const RESERVED_DATE_END: &str = "de";
const RESERVED_LINE_START: &str = "lns";
const RESERVED_LINE_END: &str = "lne";
const RESERVED_CONTEXT_BEFORE: &str = "lcb";
const RESERVED_CONTEXT_AFTER: &str = "lca";

/// Overall shape a clause-grammar line must satisfy.
static SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[$].+(="+|=-"+).+["]$"#).expect("shape pattern is valid")
});

/// Clause heads: `$names=` possibly followed by the exclusion minus.
static CLAUSE_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\S+=").expect("clause head pattern is valid"));

/// One `(field, include, pattern)` test.
#[derive(Debug, Clone)]
pub struct FieldClause {
    /// Wire name of the field, or [`crate::record::ANY_FIELD`].
    pub name: String,
    /// `true` for `$name="..."`, `false` for `$name=-"..."` (exclusion).
    pub include: bool,
    /// Compiled wildcard pattern.
    pub pattern: Regex,
}

/// Compiled search intent.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Case-insensitive substring matched against every searchable field when
    /// no field clauses are present.
    pub free_text: Option<String>,
    /// Records containing this substring in any searchable field are rejected
    /// outright (consulted only when no field clauses are present).
    pub exclude_text: Option<String>,
    /// Ordered field tests; clauses sharing a name are OR-ed together.
    pub field_clauses: Vec<FieldClause>,
    /// Inclusive sequence-number bounds; `None` means unbounded on that side.
    pub line_start: Option<u64>,
    pub line_end: Option<u64>,
    /// Inclusive lexical timestamp bounds.
    pub date_begin: Option<String>,
    pub date_end: Option<String>,
    /// Neighboring records retained around each match.
    pub context_before: usize,
    pub context_after: usize,
}

impl Query {
    /// Plain free-text query (no clause grammar involved).
    pub fn free_text(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            free_text: (!term.trim().is_empty()).then(|| term.trim().to_string()),
            ..Self::default()
        }
    }

    /// Dispatch on the sentinel: compile the clause grammar when the trimmed
    /// line starts with `$`, otherwise build a free-text query.
    pub fn from_search_line(line: &str) -> Result<Self> {
        if line.trim_start().starts_with(QUERY_SENTINEL) {
            Self::parse(line)
        } else {
            Ok(Self::free_text(line))
        }
    }

    /// Compile a clause-grammar line into a query.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        check_line(line)?;

        let mut query = Self::default();
        for clause in split_clauses(line)? {
            apply_clause(clause, &mut query)?;
        }

        Ok(query)
    }

    /// Whether any line/date bound is set.
    pub fn has_range_bounds(&self) -> bool {
        self.line_start.is_some()
            || self.line_end.is_some()
            || self.date_begin.is_some()
            || self.date_end.is_some()
    }

    /// Whether the query tests anything beyond its range bounds.
    pub fn has_match_clauses(&self) -> bool {
        !self.field_clauses.is_empty()
            || self.free_text.as_deref().map_or(false, |t| !t.is_empty())
    }
}

/// Validate the raw line before splitting. Quote parity is checked before the
/// shape so an unescaped quote is always reported as such.
fn check_line(line: &str) -> Result<()> {
    if line.is_empty() {
        return Err(LoggrindError::malformed_query("query line is empty"));
    }

    if line.chars().filter(|c| *c == '"').count() % 2 != 0 {
        return Err(LoggrindError::UnescapedQuote);
    }

    if !SHAPE_RE.is_match(line) {
        return Err(LoggrindError::malformed_query(
            "line does not match the clause shape $name=\"value\"",
        ));
    }

    Ok(())
}

/// Slice the line into clauses at each `$name=` head. Text between heads (a
/// quoted value containing spaces, say) stays glued to the preceding clause.
fn split_clauses(line: &str) -> Result<Vec<&str>> {
    let starts: Vec<usize> = CLAUSE_HEAD_RE.find_iter(line).map(|m| m.start()).collect();

    match starts.first() {
        Some(0) => {}
        _ => {
            return Err(LoggrindError::malformed_query(
                "query must start with a $name= clause",
            ))
        }
    }

    let mut clauses = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(line.len());
        clauses.push(line[start..end].trim());
    }

    Ok(clauses)
}

/// Fold one clause into the query: reserved names assign controls directly and
/// never become field clauses; every other name appends an OR-able field test.
fn apply_clause(clause: &str, query: &mut Query) -> Result<()> {
    let body = clause.trim_start_matches(QUERY_SENTINEL);
    let (names, value) = body
        .split_once('=')
        .ok_or_else(|| LoggrindError::malformed_query(format!("clause {clause:?} has no value")))?;

    let include = !value.starts_with('-');
    let value = value.strip_prefix('-').unwrap_or(value);
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(|| {
            LoggrindError::malformed_query(format!("clause {clause:?} value is not quoted"))
        })?;

    for name in clause_names(names, clause)? {
        match name {
            RESERVED_DATE_BEGIN => query.date_begin = Some(value.to_string()),
            RESERVED_DATE_END => query.date_end = Some(value.to_string()),
            RESERVED_LINE_START => query.line_start = Some(parse_number(name, value)?),
            RESERVED_LINE_END => query.line_end = Some(parse_number(name, value)?),
            RESERVED_CONTEXT_BEFORE => {
                query.context_before = parse_number(name, value)? as usize
            }
            RESERVED_CONTEXT_AFTER => query.context_after = parse_number(name, value)? as usize,
            _ => query.field_clauses.push(FieldClause {
                name: name.to_string(),
                include,
                pattern: compile_pattern(value)?,
            }),
        }
    }

    Ok(())
}

fn clause_names<'a>(names: &'a str, clause: &str) -> Result<Vec<&'a str>> {
    let names: Vec<&str> = names
        .split(QUERY_SENTINEL)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(LoggrindError::malformed_query(format!(
            "clause {clause:?} names no attribute"
        )));
    }
    Ok(names)
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| LoggrindError::invalid_range_value(name, value))
}

fn compile_pattern(value: &str) -> Result<Regex> {
    let pattern = pattern::wildcard_to_regex(value)?;
    Regex::new(&pattern)
        .map_err(|e| LoggrindError::malformed_query(format!("unusable pattern: {e}")))
}
