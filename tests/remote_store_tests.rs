use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration as StdDuration;
use sunan_radar::history::{HistoryError, HistoryRecord, HistoryStore, RemoteStore};
use sunan_radar::scoring::{Diagnosis, ScoreResult};

fn sample_record() -> HistoryRecord {
    let result = ScoreResult {
        effectiveness: 86.2,
        immunity: 78.5,
        cohesion: 96.0,
        diagnosis: Diagnosis::Balanced,
        actions: vec![],
    };
    let at = NaiveDate::from_ymd_opt(2024, 5, 14)
        .expect("valid date")
        .and_hms_opt(18, 30, 5)
        .expect("valid time");
    HistoryRecord::from_result("amina", &result, at)
}

fn store(server: &MockServer, token: Option<&str>, max_retries: usize) -> RemoteStore {
    RemoteStore::new(
        server.url("/rows"),
        StdDuration::from_secs(2),
        token.map(str::to_string),
        max_retries,
    )
    .expect("client builds")
}

#[tokio::test]
async fn append_posts_six_cells_with_bearer_token() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rows")
                .header("authorization", "Bearer secret-token")
                .json_body(json!({
                    "values": [
                        "amina",
                        "2024-05-14 18:30:05",
                        "86.2",
                        "78.5",
                        "96",
                        "Balanced: keep to your current course."
                    ]
                }));
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    store(&server, Some("secret-token"), 0)
        .append(&sample_record())
        .await
        .expect("append succeeds");

    mock.assert_async().await;
}

#[tokio::test]
async fn load_skips_header_and_malformed_rows() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/rows");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "values": [
                        ["display_name", "timestamp", "effectiveness", "immunity", "cohesion", "diagnosis_text"],
                        ["amina", "2024-05-14 18:30:05", "86.2", "78.5", "96", "Balanced: keep to your current course."],
                        ["yusuf", "2024-05-14 19:00:00", "86,2", "40", "50", "Warning: exposed effort."],
                        ["omar", "yesterday", "50", "50", "50", "Balanced: keep to your current course."],
                        ["short row"],
                        ["layla", "2024-05-15 08:00:00", "30", "29.7", "50", "Warning: stagnation."]
                    ]
                }));
        })
        .await;

    let records = store(&server, None, 0).load().await.expect("load succeeds");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], sample_record());
    assert_eq!(records[1].display_name, "layla");
    assert_eq!(records[1].immunity, 29.7);
}

#[tokio::test]
async fn load_of_empty_sheet_is_empty() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/rows");
            then.status(200).json_body(json!({"values": []}));
        })
        .await;

    let records = store(&server, None, 0).load().await.expect("load succeeds");
    assert!(records.is_empty());
}

#[tokio::test]
async fn append_retries_server_errors_then_gives_up() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/rows");
            then.status(503);
        })
        .await;

    let err = store(&server, None, 2)
        .append(&sample_record())
        .await
        .expect_err("append fails");

    assert!(matches!(err, HistoryError::Http { status: 503 }));
    // One attempt plus two retries
    mock.assert_hits_async(3).await;
}

#[tokio::test]
async fn append_does_not_retry_client_errors() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/rows");
            then.status(401);
        })
        .await;

    let err = store(&server, Some("wrong"), 3)
        .append(&sample_record())
        .await
        .expect_err("append fails");

    assert!(matches!(err, HistoryError::Http { status: 401 }));
    assert!(!err.is_retryable());
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/rows");
            then.status(200).delay(StdDuration::from_millis(800));
        })
        .await;

    let remote = RemoteStore::new(server.url("/rows"), StdDuration::from_millis(100), None, 0)
        .expect("client builds");
    let err = remote
        .append(&sample_record())
        .await
        .expect_err("append times out");

    assert!(matches!(err, HistoryError::Timeout));
}

#[tokio::test]
async fn unreadable_response_is_reported() {
    let server = MockServer::start_async().await;

    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/rows");
            then.status(200).body("<html>sign in</html>");
        })
        .await;

    let err = store(&server, None, 0).load().await.expect_err("load fails");
    assert!(matches!(err, HistoryError::InvalidResponse(_)));
}

#[tokio::test]
async fn history_store_dispatches_to_remote() {
    let server = MockServer::start_async().await;

    let post = server
        .mock_async(|when, then| {
            when.method(POST).path("/rows");
            then.status(200);
        })
        .await;

    let history = HistoryStore::Remote(store(&server, None, 0));
    assert_eq!(history.describe(), server.url("/rows"));
    history.append(sample_record()).await.expect("append succeeds");
    post.assert_async().await;
}
