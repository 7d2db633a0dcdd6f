// ZDB-51: Session API tests driven through the router

mod common;

use axum::http::StatusCode;
use common::{send_request, test_state, ScriptedFetcher, ScriptedSummarizer, MARKETING_PAGE};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use zeroday_backend_core::{
    build_router,
    models::FetchResult,
    services::{SessionLimits, SessionStore},
};

fn app() -> axum::Router {
    app_with(ScriptedSummarizer::new())
}

fn app_with(summarizer: ScriptedSummarizer) -> axum::Router {
    let fetcher = Arc::new(ScriptedFetcher::always(FetchResult::fetched(MARKETING_PAGE)));
    build_router(test_state(fetcher, Arc::new(summarizer)))
}

async fn new_session(app: &axum::Router) -> String {
    let (status, body) = send_request(app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

async fn wait_for_report(app: &axum::Router, session_id: &str) -> Value {
    let uri = format!("/api/v1/sessions/{}/report", session_id);
    for _ in 0..100 {
        let (status, body) = send_request(app, "GET", &uri, None).await;
        if status == StatusCode::OK {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("report never became available");
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send_request(&app, "GET", "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["summarizer"]["provider"], "scripted");
    assert_eq!(body["summarizer"]["model"], "scripted-1");
}

// =============================================================================
// SESSIONS
// =============================================================================

#[tokio::test]
async fn test_create_and_get_session() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_request(&app, "GET", &format!("/api/v1/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert_eq!(body["messages"], json!([]));
    assert!(body["current_report"].is_null());
    assert_eq!(body["awaiting_reply"], false);
}

#[tokio::test]
async fn test_session_capacity_is_503() {
    let fetcher = Arc::new(ScriptedFetcher::always(FetchResult::fetched(MARKETING_PAGE)));
    let mut state = test_state(fetcher, Arc::new(ScriptedSummarizer::new()));
    state.sessions = SessionStore::with_limits(SessionLimits {
        idle_ttl: Duration::from_secs(3600),
        max_sessions: 1,
    });
    let app = build_router(state);

    new_session(&app).await;
    let (status, body) = send_request(&app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Too many active sessions, try again later");
    assert_eq!(body["status"], 503);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app();
    let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
    let (status, body) = send_request(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_report_missing_before_first_scan() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) =
        send_request(&app, "GET", &format!("/api/v1/sessions/{}/report", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

// =============================================================================
// SCANS
// =============================================================================

#[tokio::test]
async fn test_empty_url_rejected() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_request(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/scans", id),
        Some(json!({ "url": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_scan_accepted_then_report_available() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_request(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/scans", id),
        Some(json!({ "url": "https://example.com", "scan_type": "passive" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["url"], "https://example.com");
    assert_eq!(body["scan_type"], "passive");
    assert!(body["scan_id"].is_string());

    let report = wait_for_report(&app, &id).await;
    assert_eq!(report["url"], "https://example.com");
    assert_eq!(report["coverage"], "full");
    assert_eq!(report["raw_output"], "assessed https://example.com");
    assert_eq!(report["findings"][0]["id"], "domain-analysis");

    let (_, messages) =
        send_request(&app, "GET", &format!("/api/v1/sessions/{}/messages", id), None).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Scan https://example.com for security issues");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn test_scan_type_defaults_to_phishing() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_request(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/scans", id),
        Some(json!({ "url": "https://example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["scan_type"], "phishing");
    wait_for_report(&app, &id).await;
}

// =============================================================================
// MESSAGES
// =============================================================================

#[tokio::test]
async fn test_send_message_returns_reply() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send_request(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/messages", id),
        Some(json!({ "content": "What makes a link suspicious?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["content"], "reply #1");
}

#[tokio::test]
async fn test_blank_message_rejected() {
    let app = app();
    let id = new_session(&app).await;

    let (status, _) = send_request(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/messages", id),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summarizer_failure_is_502() {
    let app = app_with(ScriptedSummarizer::failing());
    let id = new_session(&app).await;

    let (status, body) = send_request(
        &app,
        "POST",
        &format!("/api/v1/sessions/{}/messages", id),
        Some(json!({ "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);

    let (_, messages) =
        send_request(&app, "GET", &format!("/api/v1/sessions/{}/messages", id), None).await;
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "hello");
}
