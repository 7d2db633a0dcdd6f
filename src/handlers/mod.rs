// ZDB-40: Session API routes

pub mod sessions;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

// Session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/sessions", post(sessions::create_session))
        .route("/api/v1/sessions/{id}", get(sessions::get_session))
        .route("/api/v1/sessions/{id}/scans", post(sessions::create_scan))
        .route(
            "/api/v1/sessions/{id}/messages",
            post(sessions::send_message).get(sessions::list_messages),
        )
        .route("/api/v1/sessions/{id}/report", get(sessions::get_report))
}
