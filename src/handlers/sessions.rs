// ZDB-42: Session API handlers
// Scan submission, free-text chat and read access to transcript and report

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    models::{
        message::SendMessageRequest,
        scan::{CreateScanRequest, ScanAccepted, ScanTarget},
    },
    services::session::SharedSession,
    utils::service_error::ServiceError,
};

async fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, ServiceError> {
    state.sessions.get(id).await.ok_or(ServiceError::SessionNotFound)
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

/// Create an empty session
/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let (id, session) = state.sessions.create().await?;
    let created_at = session.read().await.snapshot().created_at;
    info!("Session {} created", id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "session_id": id,
            "created_at": created_at,
        })),
    ))
}

/// Transcript, current report and scans in flight
/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = find_session(&state, id).await?;
    let snapshot = session.read().await.snapshot();
    Ok(Json(snapshot))
}

// =============================================================================
// SCAN HANDLERS
// =============================================================================

/// Submit a URL; the pipeline runs in the background
/// POST /api/v1/sessions/{id}/scans
pub async fn create_scan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateScanRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let session = find_session(&state, id).await?;
    let target = ScanTarget::new(request.url, request.scan_type);
    let scan_id = state.orchestrator.start_scan(&session, &target).await;

    let accepted = ScanAccepted {
        scan_id,
        url: target.url().to_string(),
        scan_type: target.scan_type(),
    };

    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        orchestrator.run_scan(&session, scan_id, &target).await;
    });

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

/// Current aggregated report
/// GET /api/v1/sessions/{id}/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = find_session(&state, id).await?;
    let report = session
        .read()
        .await
        .current_report()
        .cloned()
        .ok_or(ServiceError::NoReport)?;
    Ok(Json(report))
}

// =============================================================================
// MESSAGE HANDLERS
// =============================================================================

/// Free-text chat turn; waits for the assistant reply
/// POST /api/v1/sessions/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let session = find_session(&state, id).await?;
    let reply = state
        .orchestrator
        .send_message(&session, &request.content)
        .await?;
    Ok(Json(reply))
}

/// GET /api/v1/sessions/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let session = find_session(&state, id).await?;
    let messages = session.read().await.messages().to_vec();
    Ok(Json(messages))
}
