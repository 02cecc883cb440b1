//! E2E tests for the Notion records source.

use calsync_core::config::NotionConfig;
use calsync_core::integrations::{NotionClient, RecordSource};
use calsync_core::records::Domain;
use calsync_core::{compute_window, IntegrationError};
use mockito::Matcher;
use serde_json::json;

fn config(server: &mockito::Server) -> NotionConfig {
    NotionConfig {
        token: "secret_test_token".to_string(),
        activity_database_id: "db-activity".to_string(),
        exercise_database_id: "db-exercise".to_string(),
        sleep_database_id: String::new(),
        api_base: server.url(),
    }
}

fn page(id: &str) -> serde_json::Value {
    json!({
        "object": "page",
        "id": id,
        "properties": {
            "Activity Name": { "title": [{ "plain_text": format!("Workout {id}") }] }
        }
    })
}

/// Test: query follows next_cursor until has_more is false.
#[tokio::test]
async fn test_notion_query_follows_pagination() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("POST", "/databases/db-exercise/query")
        .match_header("authorization", "Bearer secret_test_token")
        .match_header("notion-version", "2022-06-28")
        .with_status(200)
        .with_body(
            json!({ "results": [page("p1"), page("p2")], "has_more": true, "next_cursor": "c2" })
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("POST", "/databases/db-exercise/query")
        .match_body(Matcher::PartialJson(json!({ "start_cursor": "c2" })))
        .with_status(200)
        .with_body(
            json!({ "results": [page("p3")], "has_more": false, "next_cursor": null }).to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = NotionClient::new(&config(&server), reqwest::Client::new());
    let window = compute_window(2025, 3).unwrap();
    let records = client.query_unprocessed(Domain::Exercise, &window).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    assert_eq!(records[2].properties["Activity Name"]["title"][0]["plain_text"], "Workout p3");
    first.assert_async().await;
    second.assert_async().await;
}

/// Test: query body filters on the window and the processed flag.
#[tokio::test]
async fn test_notion_query_sends_window_filter() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/databases/db-activity/query")
        .match_body(Matcher::PartialJson(json!({
            "filter": { "and": [
                { "property": "Date", "date": { "on_or_after": "2025-01-12" } },
                { "property": "Date", "date": { "on_or_before": "2025-01-18" } },
                { "property": "Calendar Created", "checkbox": { "equals": false } }
            ] }
        })))
        .with_status(200)
        .with_body(r#"{"results":[],"has_more":false}"#)
        .create_async()
        .await;

    let client = NotionClient::new(&config(&server), reqwest::Client::new());
    let window = compute_window(2025, 3).unwrap();
    let records = client.query_unprocessed(Domain::Activity, &window).await.unwrap();
    assert!(records.is_empty());
    mock.assert_async().await;
}

/// Test: marking processed patches the checkbox.
#[tokio::test]
async fn test_notion_set_processed_patches_checkbox() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PATCH", "/pages/p1")
        .match_body(Matcher::Json(json!({
            "properties": { "Calendar Created": { "checkbox": true } }
        })))
        .with_status(200)
        .with_body(r#"{"object":"page","id":"p1"}"#)
        .create_async()
        .await;

    let client = NotionClient::new(&config(&server), reqwest::Client::new());
    client.set_processed(Domain::Exercise, "p1").await.unwrap();
    mock.assert_async().await;
}

/// Test: a rejected token surfaces as an auth error with Notion's message.
#[tokio::test]
async fn test_notion_ping_rejected_token() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/databases/db-activity")
        .with_status(401)
        .with_body(r#"{"object":"error","code":"unauthorized","message":"API token is invalid."}"#)
        .create_async()
        .await;

    let client = NotionClient::new(&config(&server), reqwest::Client::new());
    match client.ping().await {
        Err(IntegrationError::Auth { service, message }) => {
            assert_eq!(service, "Notion");
            assert_eq!(message, "API token is invalid.");
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}

/// Test: an unconfigured database is reported without any request.
#[tokio::test]
async fn test_notion_unconfigured_database() {
    let server = mockito::Server::new_async().await;
    let client = NotionClient::new(&config(&server), reqwest::Client::new());
    let window = compute_window(2025, 3).unwrap();
    let err = client.query_unprocessed(Domain::Sleep, &window).await.unwrap_err();
    assert!(matches!(err, IntegrationError::NotConfigured(_)));
}
