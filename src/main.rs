//! loggrind - Structured Log Search
//!
//! Search JSON-per-line log files with field clauses, wildcards and context.

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use loggrind::search::SearchEngine;
use loggrind::{detail, Query};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("loggrind")
        .version(loggrind::VERSION)
        .about("Search structured JSON-per-line log files")
        .long_about(
            "loggrind evaluates a search expression against a JSON-per-line log file. \
             Queries starting with $ use the clause grammar ($name=\"value\", * as \
             wildcard, ** as a literal *); anything else is a free-text search across \
             all fields.",
        )
        .arg(
            Arg::new("file")
                .help("Path to the log file to search")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("query")
                .help("Search expression ($-grammar or free text)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .short('x')
                .help("Reject records containing this text in any field"),
        )
        .arg(
            Arg::new("before")
                .long("before")
                .short('B')
                .value_parser(clap::value_parser!(usize))
                .help("Context lines to keep before each match"),
        )
        .arg(
            Arg::new("after")
                .long("after")
                .short('A')
                .value_parser(clap::value_parser!(usize))
                .help("Context lines to keep after each match"),
        )
        .arg(
            Arg::new("detail")
                .long("detail")
                .action(ArgAction::SetTrue)
                .help("Print each exact match as a full labelled detail view"),
        )
        .get_matches();

    let file_path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .expect("file argument is required"),
    );
    let search_line = matches
        .get_one::<String>("query")
        .expect("query argument is required");

    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", file_path.display());
    }
    if !file_path.is_file() {
        anyhow::bail!("Path is not a regular file: {}", file_path.display());
    }

    let mut query = Query::from_search_line(search_line)?;
    if let Some(exclude) = matches.get_one::<String>("exclude") {
        query.exclude_text = Some(exclude.clone());
    }
    if let Some(before) = matches.get_one::<usize>("before") {
        query.context_before = *before;
    }
    if let Some(after) = matches.get_one::<usize>("after") {
        query.context_after = *after;
    }

    let engine = SearchEngine::new();
    let mut status = engine.search_file(&file_path, &query, &CancellationToken::new())?;

    let outcome = status.outcome_mut();
    outcome.query_label = search_line.clone();
    outcome.file_path = file_path.display().to_string();
    outcome.file_name = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if matches.get_flag("detail") {
        for record in &outcome.exact_matches {
            println!("{}", detail::format_record(record));
            println!("---");
        }
    } else {
        for record in &outcome.with_context {
            let marker = if outcome.exact_matches.contains(record) {
                '>'
            } else {
                ' '
            };
            let line = record.raw_line.as_deref().unwrap_or("");
            println!("{marker} {:>6}  {line}", record.seq);
        }
    }

    println!("{outcome}");

    Ok(())
}
