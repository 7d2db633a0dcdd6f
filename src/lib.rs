// Library exports for the ZeroDay backend
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use services::{
    ContentFetcher, HttpContentFetcher, RuleBasedSummarizer, ScanOrchestrator, ScanOutcome,
    SessionStore, Summarizer,
};
pub use utils::{analyze_domain, analyze_html};

use app_config::SummarizerProvider;
use services::{ContentFetcherConfig, GeminiSummarizer};
use utils::{DomainAnalyzer, HtmlAnalyzer};

/// Wire the analyzers, fetcher and summarizer described by `config`
pub fn initialize_app_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let fetcher = HttpContentFetcher::new(ContentFetcherConfig::from(&config.scanner))?;

    let summarizer: Arc<dyn Summarizer> = match config.summarizer.effective_provider() {
        SummarizerProvider::Gemini => Arc::new(GeminiSummarizer::new(
            config.summarizer.api_key.clone().unwrap_or_default(),
            config.summarizer.model.clone(),
            config.summarizer.api_base_url.clone(),
            config.summarizer.timeout(),
        )?),
        SummarizerProvider::RuleBased => {
            if config.summarizer.provider == SummarizerProvider::Gemini {
                warn!("GEMINI_API_KEY is not set, falling back to the rule-based summarizer");
            }
            Arc::new(RuleBasedSummarizer::new())
        },
    };
    info!(
        "Summarizer: {} ({})",
        summarizer.name(),
        summarizer.model()
    );

    let orchestrator = ScanOrchestrator::new(
        DomainAnalyzer::new((&config.scanner).into()),
        HtmlAnalyzer::new((&config.scanner).into()),
        Arc::new(fetcher),
        summarizer,
    );

    Ok(AppState::new(config.clone(), orchestrator))
}

/// Full router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .route("/api/v1/health", get(health_check))
        .merge(handlers::session_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

// Health check handler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let summarizer = state.orchestrator.summarizer();
    let sessions = state.sessions.len().await;

    Json(serde_json::json!({
        "status": "healthy",
        "service": "zeroday-backend",
        "environment": state.config.server.environment.to_string(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "summarizer": {
            "provider": summarizer.name(),
            "model": summarizer.model(),
        },
        "sessions": sessions,
    }))
}
