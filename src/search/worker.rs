//! Async wrapper around the search engine.
//!
//! The engine itself is synchronous and deterministic; this worker is the
//! scheduling convenience that keeps a UI thread responsive. Scans run on
//! blocking tasks and send their own response, so the command loop stays free
//! to receive `CancelSearch` while a scan is in flight.

use crate::query::Query;
use crate::search::engine::SearchEngine;
use crate::search::protocol::{SearchCommand, SearchResponse, SearchSource};
use log::debug;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;

/// Run the search worker, processing commands until `Shutdown` or until the
/// command channel closes. Shutdown cancels any scan still in flight.
pub async fn search_worker_loop(mut rx: Receiver<SearchCommand>, tx: Sender<SearchResponse>) {
    let mut active_scan: Option<CancellationToken> = None;

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SearchCommand::ExecuteSearch {
                request_id,
                source,
                query,
                label,
            } => {
                let token = CancellationToken::new();
                // A new search supersedes whatever scan is still in flight.
                if let Some(previous) = active_scan.replace(token.clone()) {
                    previous.cancel();
                }
                spawn_scan(request_id, source, query, label, token, tx.clone());
            }
            SearchCommand::CancelSearch => {
                if let Some(token) = active_scan.take() {
                    debug!("cancelling active scan");
                    token.cancel();
                }
            }
            SearchCommand::Shutdown => {
                if let Some(token) = active_scan.take() {
                    token.cancel();
                }
                break;
            }
        }
    }
}

fn spawn_scan(
    request_id: u64,
    source: SearchSource,
    query: Query,
    label: String,
    token: CancellationToken,
    tx: Sender<SearchResponse>,
) {
    tokio::task::spawn_blocking(move || {
        let engine = SearchEngine::new();
        let result = match &source {
            SearchSource::Records(records) => {
                engine.search_records(records.iter().cloned(), &query, &token)
            }
            SearchSource::File(path) => engine.search_file(path, &query, &token),
        };

        let response = match result {
            Ok(mut status) => {
                let outcome = status.outcome_mut();
                outcome.query_label = label;
                if let SearchSource::File(path) = &source {
                    outcome.file_path = path.display().to_string();
                    outcome.file_name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                }
                SearchResponse::Finished { request_id, status }
            }
            Err(error) => SearchResponse::Error { request_id, error },
        };

        // The coordinator may be gone by the time a scan finishes.
        let _ = tx.blocking_send(response);
    });
}
