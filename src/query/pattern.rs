//! Wildcard search terms to regex patterns.
//!
//! The query grammar uses `*` as "any run of characters, including none" and
//! `**` as an escape for one literal `*`. Literal runs are escaped with
//! [`regex::escape`], so user input never needs regex knowledge.

use crate::error::{LoggrindError, Result};

/// Regex fragment standing in for one wildcard run.
pub const ANY_RUN: &str = ".*";

const WILDCARD: char = '*';

/// Convert a wildcard search term into an anchored regex pattern.
///
/// A term without a leading wildcard anchors at the start (`^`), one without a
/// trailing wildcard anchors at the end (`$`); interior wildcard runs collapse
/// into a single [`ANY_RUN`] so the pattern never contains two back to back.
pub fn wildcard_to_regex(term: &str) -> Result<String> {
    let segments = split_on_wildcards(term);

    let mut pattern = String::new();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if !segment.is_empty() {
            if i == 0 {
                pattern.push('^');
            }
            pattern.push_str(&regex::escape(segment));
            if i == last {
                pattern.push('$');
            } else {
                pattern.push_str(ANY_RUN);
            }
        } else if last > 0 && !pattern.ends_with(ANY_RUN) {
            // An empty segment borders a wildcard; a lone empty segment is
            // just an empty term.
            pattern.push_str(ANY_RUN);
        }
    }

    if pattern.is_empty() {
        return Err(LoggrindError::EmptyPattern);
    }

    Ok(pattern)
}

/// Split the term into literal segments at each wildcard, resolving the `**`
/// escape to a literal `*` inside the current segment. Always returns at least
/// one (possibly empty) segment; N wildcards produce N+1 segments.
fn split_on_wildcards(term: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = term.chars().peekable();

    while let Some(c) = chars.next() {
        if c == WILDCARD {
            if chars.peek() == Some(&WILDCARD) {
                chars.next();
                current.push(WILDCARD);
            } else {
                segments.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    segments.push(current);

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn compile(term: &str) -> Regex {
        Regex::new(&wildcard_to_regex(term).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_term_is_fully_anchored() {
        let pattern = wildcard_to_regex("timeout").unwrap();
        assert_eq!(pattern, "^timeout$");

        let re = compile("timeout");
        assert!(re.is_match("timeout"));
        assert!(!re.is_match("timeout!"));
        assert!(!re.is_match("a timeout"));
    }

    #[test]
    fn test_interior_wildcards() {
        let re = compile("*A*B*");
        assert!(re.is_match("xxAyyBzz"));
        assert!(re.is_match("AB"));
        assert!(!re.is_match("only A here"));
        assert!(!re.is_match("only B here"));
        assert!(!re.is_match("B before A"));
    }

    #[test]
    fn test_anchoring_follows_wildcard_placement() {
        let prefix = compile("warn*");
        assert!(prefix.is_match("warning: disk full"));
        assert!(!prefix.is_match("last warn"));

        let suffix = compile("*full");
        assert!(suffix.is_match("disk full"));
        assert!(!suffix.is_match("full disk"));
    }

    #[test]
    fn test_double_asterisk_is_literal() {
        let pattern = wildcard_to_regex("*A**B*").unwrap();
        assert_eq!(pattern, r".*A\*B.*");

        let re = compile("*A**B*");
        assert!(re.is_match("xA*By"));
        assert!(!re.is_match("xAyB"));
    }

    #[test]
    fn test_wildcard_runs_collapse() {
        assert_eq!(wildcard_to_regex("a***b").unwrap(), r"^a\*.*b$");
        assert_eq!(wildcard_to_regex("*").unwrap(), ANY_RUN);
        // Four asterisks: two literal stars, no wildcard at all.
        assert_eq!(wildcard_to_regex("****").unwrap(), r"^\*\*$");
    }

    #[test]
    fn test_metacharacters_are_escaped() {
        let re = compile("(value)+*");
        assert!(re.is_match("(value)+ trailing"));
        assert!(!re.is_match("value"));
    }

    #[test]
    fn test_empty_term_is_rejected() {
        match wildcard_to_regex("") {
            Err(LoggrindError::EmptyPattern) => {}
            other => panic!("expected EmptyPattern, got {other:?}"),
        }
    }
}
