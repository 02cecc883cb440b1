//! E2E tests for the Google Calendar destination.

use calsync_core::config::{CalendarsConfig, GoogleAccountConfig, GoogleConfig};
use calsync_core::integrations::{CalendarService, GoogleCalendarClient};
use calsync_core::{CalendarSelector, EventPayload, EventSpan, IntegrationError};
use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

fn account(name: &str) -> GoogleAccountConfig {
    GoogleAccountConfig {
        client_id: format!("{name}-client"),
        client_secret: format!("{name}-secret"),
        refresh_token: format!("{name}-refresh"),
    }
}

fn google(server: &mockito::Server, work: GoogleAccountConfig) -> GoogleConfig {
    GoogleConfig {
        api_base: server.url(),
        token_url: format!("{}/token", server.url()),
        personal: account("personal"),
        work,
    }
}

fn calendars() -> CalendarsConfig {
    CalendarsConfig {
        personal_activity: "personal-cal".to_string(),
        work_activity: "work-cal".to_string(),
        fitness: "fitness-cal".to_string(),
        normal_wake_up: String::new(),
        sleep_in: "sleep-in-cal".to_string(),
    }
}

fn calendar_client(server: &mockito::Server, work: GoogleAccountConfig) -> GoogleCalendarClient {
    GoogleCalendarClient::new(&google(server, work), &calendars(), reqwest::Client::new())
}

fn all_day(calendar: CalendarSelector) -> EventPayload {
    EventPayload {
        title: "blog: 3 commits".to_string(),
        description: "💻 me/blog".to_string(),
        span: EventSpan::AllDay(NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()),
        calendar,
    }
}

/// Test: one token refresh serves several inserts.
#[tokio::test]
async fn test_google_insert_reuses_access_token() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("refresh_token".into(), "personal-refresh".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.personal","expires_in":3599,"token_type":"Bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/calendars/personal-cal/events")
        .match_header("authorization", "Bearer ya29.personal")
        .match_body(Matcher::PartialJson(json!({
            "summary": "blog: 3 commits",
            "start": { "date": "2025-01-14" },
            "end": { "date": "2025-01-14" }
        })))
        .with_status(200)
        .with_body(r#"{"id":"evt123","status":"confirmed"}"#)
        .expect(2)
        .create_async()
        .await;

    let client = calendar_client(&server, GoogleAccountConfig::default());
    let payload = all_day(CalendarSelector::PersonalActivity);
    for _ in 0..2 {
        let id = client
            .insert_event(CalendarSelector::PersonalActivity, &payload)
            .await
            .unwrap();
        assert_eq!(id, "evt123");
    }

    token.assert_async().await;
    insert.assert_async().await;
}

/// Test: work activity events use the work account's token.
#[tokio::test]
async fn test_google_work_calendar_uses_work_account() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("client_id".into(), "work-client".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.work","expires_in":3599}"#)
        .create_async()
        .await;
    let insert = server
        .mock("POST", "/calendars/work-cal/events")
        .match_header("authorization", "Bearer ya29.work")
        .with_status(200)
        .with_body(r#"{"id":"evt-work"}"#)
        .create_async()
        .await;

    let client = calendar_client(&server, account("work"));
    let id = client
        .insert_event(CalendarSelector::WorkActivity, &all_day(CalendarSelector::WorkActivity))
        .await
        .unwrap();
    assert_eq!(id, "evt-work");
    insert.assert_async().await;
}

/// Test: ping lists calendars for every configured account.
#[tokio::test]
async fn test_google_ping_checks_each_account() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.any","expires_in":3599}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/users/me/calendarList")
        .with_status(200)
        .with_body(r#"{"items":[{"id":"primary"},{"id":"fitness-cal"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let client = calendar_client(&server, account("work"));
    client.ping().await.unwrap();
    list.assert_async().await;
}

/// Test: a revoked refresh token fails the ping as an auth error.
#[tokio::test]
async fn test_google_ping_revoked_refresh_token() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
        )
        .create_async()
        .await;

    let client = calendar_client(&server, GoogleAccountConfig::default());
    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, IntegrationError::Auth { .. }));
}

/// Test: API errors carry Google's message.
#[tokio::test]
async fn test_google_insert_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.any","expires_in":3599}"#)
        .create_async()
        .await;
    let _insert = server
        .mock("POST", "/calendars/fitness-cal/events")
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"Not Found"}}"#)
        .create_async()
        .await;

    let client = calendar_client(&server, GoogleAccountConfig::default());
    let result = client
        .insert_event(CalendarSelector::Fitness, &all_day(CalendarSelector::Fitness))
        .await;
    match result {
        Err(IntegrationError::Api { status, message, .. }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

/// Test: selectors without a calendar id or account are not configured.
#[tokio::test]
async fn test_google_unconfigured_targets() {
    let server = mockito::Server::new_async().await;
    let client = calendar_client(&server, GoogleAccountConfig::default());

    let err = client
        .insert_event(CalendarSelector::NormalWakeUp, &all_day(CalendarSelector::NormalWakeUp))
        .await
        .unwrap_err();
    assert!(matches!(err, IntegrationError::NotConfigured(_)));

    let err = client
        .insert_event(CalendarSelector::WorkActivity, &all_day(CalendarSelector::WorkActivity))
        .await
        .unwrap_err();
    assert!(matches!(err, IntegrationError::NotConfigured(_)));
}
