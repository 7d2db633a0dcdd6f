// ZDB-32: Conversational summarizer providers
// Turns the transcript (and, for scans, the analysis digest) into an assistant reply

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::message::{Message, Role};
use crate::models::report::{AggregatedReport, Severity};
use crate::models::scan::ScanType;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Summarizer request failed: {0}")]
    Request(String),

    #[error("Summarizer API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Summarizer response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("Summarizer returned no text")]
    EmptyResponse,

    #[error("Summarizer is not configured: {0}")]
    NotConfigured(String),
}

/// Fixed instructions given to language-model providers
pub const SYSTEM_PROMPT: &str = "You are ZeroDay, a web security assistant that helps people decide whether a URL is safe to use. \
When given scan results, respond with the sections **Risk Level** (LOW, MEDIUM or HIGH), **Summary**, \
**Key Findings** and **Recommendations**, grounding every statement in the supplied evidence. \
When answering follow-up questions, be concise and practical and never invent scan results.";

/// Machine-generated material for one scan. Never shown in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    pub url: String,
    pub digest: String,
    pub instruction: String,
    pub severity: Severity,
    /// `title: evidence` lines for each finding
    pub highlights: Vec<String>,
}

impl AnalysisContext {
    pub fn from_report(report: &AggregatedReport) -> Self {
        let lead = match report.scan_type {
            ScanType::Phishing => "Perform a comprehensive phishing and security analysis",
            ScanType::Passive => "Perform a passive security analysis",
        };
        Self {
            url: report.url.clone(),
            digest: report.summary.clone(),
            instruction: format!(
                "{}:\n\n{}\n\nProvide a detailed security assessment following the required format.",
                lead, report.summary
            ),
            severity: report.overall_severity(),
            highlights: report
                .findings
                .iter()
                .map(|f| format!("{}: {}", f.title, f.evidence))
                .collect(),
        }
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Produce the next assistant message for `transcript`.
    async fn summarize(
        &self,
        transcript: &[Message],
        context: Option<&AnalysisContext>,
    ) -> Result<String, SummarizerError>;

    /// Provider name for display
    fn name(&self) -> &str;

    /// Model identifier for display
    fn model(&self) -> &str;
}

// =============================================================================
// GEMINI PROVIDER
// =============================================================================

pub struct GeminiSummarizer {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiSummarizer {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, SummarizerError> {
        if api_key.trim().is_empty() {
            return Err(SummarizerError::NotConfigured("missing API key".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummarizerError::Request(e.to_string()))?;

        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Request body for `generateContent`. The analysis instruction joins the
/// fixed prompt in `systemInstruction`; `contents` carries only the transcript.
pub fn build_request_body(transcript: &[Message], context: Option<&AnalysisContext>) -> Value {
    let mut contents: Vec<Value> = transcript
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut system_parts = vec![json!({ "text": SYSTEM_PROMPT })];
    if let Some(context) = context {
        system_parts.push(json!({ "text": context.instruction }));

        // The API expects the conversation to end on a user turn
        if contents.last().map(|c| c["role"] != "user").unwrap_or(true) {
            contents.push(json!({
                "role": "user",
                "parts": [{ "text": format!("Assess {}", context.url) }],
            }));
        }
    }

    json!({
        "systemInstruction": { "parts": system_parts },
        "contents": contents,
    })
}

fn parse_candidate_text(response: &Value) -> Result<String, SummarizerError> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| SummarizerError::InvalidResponse("missing candidate parts".to_string()))?;

    let text = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(SummarizerError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(
        &self,
        transcript: &[Message],
        context: Option<&AnalysisContext>,
    ) -> Result<String, SummarizerError> {
        let body = build_request_body(transcript, context);
        debug!(
            "Sending {} turns to {} (analysis context: {})",
            transcript.len(),
            self.model,
            context.is_some()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizerError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SummarizerError::InvalidResponse(e.to_string()))?;

        parse_candidate_text(&payload)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// =============================================================================
// RULE-BASED PROVIDER
// =============================================================================

/// Offline provider used when no language model is configured. Renders a
/// fixed-format assessment from the analysis context.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedSummarizer;

impl RuleBasedSummarizer {
    pub fn new() -> Self {
        Self
    }

    fn assess(context: &AnalysisContext) -> String {
        let (level, verdict, advice) = match context.severity {
            Severity::High => (
                "HIGH",
                "shows strong signs of phishing or compromise",
                "Do not enter credentials, payment details or personal data on this site. Reach the service through a bookmarked or typed address instead.",
            ),
            Severity::Medium => (
                "MEDIUM",
                "shows some warning signs",
                "Proceed with caution and verify the site through an independent channel before signing in.",
            ),
            Severity::Low => (
                "LOW",
                "shows no significant phishing indicators",
                "No action required, but stay alert to unexpected requests for credentials.",
            ),
        };

        let findings = if context.highlights.is_empty() {
            "- None".to_string()
        } else {
            context
                .highlights
                .iter()
                .map(|h| format!("- {}", h))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "**Risk Level:** {}\n\n**Summary:** {} {}.\n\n**Key Findings:**\n{}\n\n**Recommendations:** {}",
            level, context.url, verdict, findings, advice
        )
    }
}

#[async_trait]
impl Summarizer for RuleBasedSummarizer {
    async fn summarize(
        &self,
        transcript: &[Message],
        context: Option<&AnalysisContext>,
    ) -> Result<String, SummarizerError> {
        if let Some(context) = context {
            return Ok(Self::assess(context));
        }

        let question = transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.trim())
            .filter(|q| !q.is_empty());

        let opening = match question {
            Some(q) => format!("No language model is configured, so I cannot answer \"{}\".", q),
            None => "No language model is configured.".to_string(),
        };
        Ok(format!(
            "{} I can only report scan results: submit a URL to scan and I will summarize what the analyzers find.",
            opening
        ))
    }

    fn name(&self) -> &str {
        "rule-based"
    }

    fn model(&self) -> &str {
        "heuristic"
    }
}
