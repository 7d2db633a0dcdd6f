// Common test utilities and helper structs
// Scripted collaborators so the pipeline runs without network access

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;
use zeroday_backend_core::{
    app::AppState,
    app_config::AppConfig,
    models::{FetchResult, Message},
    services::{AnalysisContext, ScanOrchestrator, Summarizer, SummarizerError},
    utils::{DomainAnalyzer, HtmlAnalyzer},
};

pub const MARKETING_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Example Widgets</title>
<link rel="stylesheet" href="/css/site.css"></head>
<body>
<h1>Widgets for every occasion</h1>
<p>We build the best widgets in the business.</p>
<a href="/pricing">Pricing</a> <a href="/about">About us</a> <a href="https://example.com/blog">Blog</a>
<img src="/img/hero.png" alt="Happy customers">
</body></html>"#;

// =============================================================================
// SCRIPTED FETCHER
// =============================================================================

/// Returns a canned result per URL after an optional delay
pub struct ScriptedFetcher {
    responses: HashMap<String, (Duration, FetchResult)>,
    fallback: FetchResult,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn always(result: FetchResult) -> Self {
        Self {
            responses: HashMap::new(),
            fallback: result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, url: &str, delay: Duration, result: FetchResult) -> Self {
        self.responses.insert(url.to_string(), (delay, result));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl zeroday_backend_core::ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(url) {
            Some((delay, result)) => {
                tokio::time::sleep(*delay).await;
                result.clone()
            },
            None => self.fallback.clone(),
        }
    }
}

// =============================================================================
// SCRIPTED SUMMARIZER
// =============================================================================

/// Replies `assessed <url>` to scans and `reply #<n>` to chat; can be told to fail
#[derive(Default)]
pub struct ScriptedSummarizer {
    fail: bool,
    seen: Mutex<Vec<(Vec<Message>, Option<AnalysisContext>)>>,
}

impl ScriptedSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Every (transcript, context) pair received so far
    pub fn seen(&self) -> Vec<(Vec<Message>, Option<AnalysisContext>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(
        &self,
        transcript: &[Message],
        context: Option<&AnalysisContext>,
    ) -> Result<String, SummarizerError> {
        let count = {
            let mut seen = self.seen.lock().unwrap();
            seen.push((transcript.to_vec(), context.cloned()));
            seen.len()
        };

        if self.fail {
            return Err(SummarizerError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }

        Ok(match context {
            Some(c) => format!("assessed {}", c.url),
            None => format!("reply #{}", count),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

pub fn orchestrator(
    fetcher: Arc<ScriptedFetcher>,
    summarizer: Arc<ScriptedSummarizer>,
) -> ScanOrchestrator {
    ScanOrchestrator::new(
        DomainAnalyzer::default(),
        HtmlAnalyzer::default(),
        fetcher,
        summarizer,
    )
}

pub fn test_state(fetcher: Arc<ScriptedFetcher>, summarizer: Arc<ScriptedSummarizer>) -> AppState {
    let config = AppConfig::from_env().expect("Failed to load test config");
    AppState::new(config, orchestrator(fetcher, summarizer))
}

/// Drive the router once; returns status and parsed JSON body (Null when empty)
pub async fn send_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
