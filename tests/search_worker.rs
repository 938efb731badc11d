use std::io::Write;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

use loggrind::search::protocol::{SearchCommand, SearchResponse, SearchSource};
use loggrind::search::worker::search_worker_loop;
use loggrind::search::{SearchEngine, SearchStatus};
use loggrind::{FileScanner, Query};

const TIMEOUT_MS: u64 = 1000;

fn write_log(lines: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    for line in lines {
        writeln!(file, "{line}").expect("write line");
    }
    file.flush().expect("flush");
    file
}

fn sample_lines() -> Vec<&'static str> {
    vec![
        r#"{"t":"2024-01-01 10:00:00","l":"Info","mt":"service started"}"#,
        r#"{"t":"2024-01-01 10:00:05","l":"Warn","mt":"cache cold"}"#,
        r#"{"t":"2024-01-01 10:00:09","l":"Error","mt":"connection refused","un":"alice"}"#,
        r#"{"t":"2024-01-01 10:00:12","l":"Info","mt":"retrying"}"#,
        r#"{"t":"2024-01-01 10:00:20","l":"Error","mt":"gave up","ex":{"type":"IOError"}}"#,
    ]
}

fn write_large_log(lines: usize) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    let mut writer = std::io::BufWriter::new(file.as_file());
    for i in 0..lines {
        writeln!(writer, r#"{{"l":"Info","mt":"heartbeat {i}"}}"#).expect("write line");
    }
    writer.flush().expect("flush");
    drop(writer);
    file
}

async fn next_response(rx: &mut mpsc::Receiver<SearchResponse>) -> SearchResponse {
    timeout(Duration::from_millis(TIMEOUT_MS), rx.recv())
        .await
        .expect("worker response timed out")
        .expect("worker channel closed unexpectedly")
}

fn spawn_worker() -> (
    mpsc::Sender<SearchCommand>,
    mpsc::Receiver<SearchResponse>,
    tokio::task::JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel(4);
    let (resp_tx, resp_rx) = mpsc::channel(4);
    let worker = tokio::spawn(search_worker_loop(cmd_rx, resp_tx));
    (cmd_tx, resp_rx, worker)
}

#[tokio::test]
async fn file_search_through_worker_finds_matches() {
    let file = write_log(&sample_lines());
    let (cmd_tx, mut resp_rx, worker) = spawn_worker();

    cmd_tx
        .send(SearchCommand::ExecuteSearch {
            request_id: 1,
            source: SearchSource::File(file.path().to_path_buf()),
            query: Query::parse(r#"$l="Error""#).unwrap(),
            label: r#"$l="Error""#.to_string(),
        })
        .await
        .unwrap();

    match next_response(&mut resp_rx).await {
        SearchResponse::Finished {
            request_id,
            status: SearchStatus::Completed(outcome),
        } => {
            assert_eq!(request_id, 1);
            let seqs: Vec<u64> = outcome.exact_matches.iter().map(|r| r.seq).collect();
            assert_eq!(seqs, vec![3, 5]);
            assert_eq!(outcome.query_label, r#"$l="Error""#);
            assert_eq!(outcome.file_path, file.path().display().to_string());
            assert!(!outcome.file_name.is_empty());
        }
        other => panic!("unexpected response: {other:?}"),
    }

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn in_memory_search_matches_file_search() {
    let file = write_log(&sample_lines());
    let query = Query::parse(r#"$mt="*refused*" $lcb="1" $lca="1""#).unwrap();
    let engine = SearchEngine::new();

    let from_file = engine
        .search_file(file.path(), &query, &CancellationToken::new())
        .unwrap()
        .into_outcome();

    let records = FileScanner::new().scan(file.path()).unwrap();
    let from_memory = engine
        .search_records(records, &query, &CancellationToken::new())
        .unwrap()
        .into_outcome();

    assert_eq!(from_file.exact_matches, from_memory.exact_matches);
    assert_eq!(from_file.with_context, from_memory.with_context);

    let context: Vec<u64> = from_file.with_context.iter().map(|r| r.seq).collect();
    assert_eq!(context, vec![2, 3, 4]);
}

#[tokio::test]
async fn worker_searches_materialized_records() {
    let file = write_log(&sample_lines());
    let records = FileScanner::new().scan(file.path()).unwrap();
    let (cmd_tx, mut resp_rx, worker) = spawn_worker();

    cmd_tx
        .send(SearchCommand::ExecuteSearch {
            request_id: 9,
            source: SearchSource::Records(records),
            query: Query::free_text("gave up"),
            label: "gave up".to_string(),
        })
        .await
        .unwrap();

    match next_response(&mut resp_rx).await {
        SearchResponse::Finished {
            request_id,
            status: SearchStatus::Completed(outcome),
        } => {
            assert_eq!(request_id, 9);
            assert_eq!(outcome.exact_matches.len(), 1);
            assert_eq!(outcome.exact_matches[0].seq, 5);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn decode_failure_surfaces_as_error_response() {
    let file = write_log(&[r#"{"mt":"fine"}"#, "{definitely not json"]);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker();

    cmd_tx
        .send(SearchCommand::ExecuteSearch {
            request_id: 3,
            source: SearchSource::File(file.path().to_path_buf()),
            query: Query::free_text("fine"),
            label: "fine".to_string(),
        })
        .await
        .unwrap();

    match next_response(&mut resp_rx).await {
        SearchResponse::Error { request_id, error } => {
            assert_eq!(request_id, 3);
            match error {
                loggrind::LoggrindError::DecodeFailure { line, .. } => assert_eq!(line, 2),
                other => panic!("expected DecodeFailure, got {other:?}"),
            }
        }
        other => panic!("unexpected response: {other:?}"),
    }

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn bare_range_query_returns_rows_in_range() {
    let file = write_log(&sample_lines());
    let (cmd_tx, mut resp_rx, worker) = spawn_worker();

    cmd_tx
        .send(SearchCommand::ExecuteSearch {
            request_id: 4,
            source: SearchSource::File(file.path().to_path_buf()),
            query: Query::parse(r#"$lns="2" $lne="4""#).unwrap(),
            label: "range".to_string(),
        })
        .await
        .unwrap();

    match next_response(&mut resp_rx).await {
        SearchResponse::Finished {
            status: SearchStatus::Completed(outcome),
            ..
        } => {
            let seqs: Vec<u64> = outcome.exact_matches.iter().map(|r| r.seq).collect();
            assert_eq!(seqs, vec![2, 3, 4]);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn cancel_delivers_partial_results_as_cancelled_finished() {
    let total = 300_000;
    let file = write_large_log(total);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker();

    cmd_tx
        .send(SearchCommand::ExecuteSearch {
            request_id: 7,
            source: SearchSource::File(file.path().to_path_buf()),
            query: Query::free_text("heartbeat"),
            label: "heartbeat".to_string(),
        })
        .await
        .unwrap();
    cmd_tx.send(SearchCommand::CancelSearch).await.unwrap();

    match next_response(&mut resp_rx).await {
        SearchResponse::Finished { request_id, status } => {
            assert_eq!(request_id, 7);
            assert!(status.is_cancelled());
            // Whatever was scanned before the cancellation is still delivered.
            assert!(status.into_outcome().exact_matches.len() < total);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn new_search_supersedes_the_one_in_flight() {
    let total = 300_000;
    let file = write_large_log(total);
    let (cmd_tx, mut resp_rx, worker) = spawn_worker();

    for request_id in [1, 2] {
        cmd_tx
            .send(SearchCommand::ExecuteSearch {
                request_id,
                source: SearchSource::File(file.path().to_path_buf()),
                query: Query::free_text("heartbeat"),
                label: "heartbeat".to_string(),
            })
            .await
            .unwrap();
    }
    cmd_tx.send(SearchCommand::CancelSearch).await.unwrap();

    for _ in 0..2 {
        match next_response(&mut resp_rx).await {
            SearchResponse::Finished { request_id, status } => {
                // The first scan was superseded by the second, so it must
                // come back cancelled with its partial outcome intact.
                if request_id == 1 {
                    assert!(status.is_cancelled());
                    assert!(status.into_outcome().exact_matches.len() < total);
                }
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn shutdown_ends_worker_loop() {
    let (cmd_tx, _resp_rx, worker) = spawn_worker();

    cmd_tx.send(SearchCommand::Shutdown).await.unwrap();
    timeout(Duration::from_millis(TIMEOUT_MS), worker)
        .await
        .expect("worker did not shut down")
        .unwrap();
}

#[tokio::test]
async fn incremental_rescan_continues_sequence_numbers() {
    let mut file = write_log(&sample_lines());
    let mut scanner = FileScanner::new();

    let initial = scanner.scan(file.path()).unwrap();
    assert_eq!(initial.len(), 5);

    writeln!(file, r#"{{"t":"2024-01-01 10:00:25","l":"Info","mt":"recovered"}}"#).unwrap();
    file.flush().unwrap();

    let appended = scanner.scan(file.path()).unwrap();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].seq, 6);

    // A search over the combined sequence sees the new record.
    let mut all = initial;
    all.extend(appended);
    let outcome = SearchEngine::new()
        .search_records(all, &Query::free_text("recovered"), &CancellationToken::new())
        .unwrap()
        .into_outcome();
    assert_eq!(outcome.exact_matches.len(), 1);
    assert_eq!(outcome.exact_matches[0].seq, 6);
}
