// ZDB-35: Scan pipeline orchestration
// Domain analysis -> fetch -> content analysis -> digest -> summarizer, per scan

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::message::Message;
use crate::models::report::AggregatedReport;
use crate::models::scan::{FetchResult, ScanTarget};
use crate::services::content_fetcher::ContentFetcher;
use crate::services::report_builder::{build_report, ContentCoverage};
use crate::services::session::{ScanStage, SharedSession};
use crate::services::summarizer::{AnalysisContext, Summarizer, SummarizerError};
use crate::utils::domain_analyzer::DomainAnalyzer;
use crate::utils::html_analyzer::HtmlAnalyzer;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Summarizer(#[from] SummarizerError),

    #[error("Pipeline aborted unexpectedly: {0}")]
    Panicked(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// How a scan ended. Either way the in-progress indicator is cleared.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Completed {
        scan_id: Uuid,
        report: AggregatedReport,
        reply: Message,
    },
    Failed {
        scan_id: Uuid,
        error: String,
        message: Message,
    },
}

impl ScanOutcome {
    pub fn scan_id(&self) -> Uuid {
        match self {
            ScanOutcome::Completed { scan_id, .. } | ScanOutcome::Failed { scan_id, .. } => *scan_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ScanOutcome::Completed { .. })
    }
}

/// Assistant message appended when a scan fails
pub fn scan_failure_message(url: &str) -> String {
    format!(
        "Sorry, I encountered an error while scanning {}. Please check the URL and try again.",
        url
    )
}

pub struct ScanOrchestrator {
    domain_analyzer: DomainAnalyzer,
    html_analyzer: HtmlAnalyzer,
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: Arc<dyn Summarizer>,
}

impl ScanOrchestrator {
    pub fn new(
        domain_analyzer: DomainAnalyzer,
        html_analyzer: HtmlAnalyzer,
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            domain_analyzer,
            html_analyzer,
            fetcher,
            summarizer,
        }
    }

    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    // =============================================================================
    // SCANS
    // =============================================================================

    /// Append the short action text to the transcript and register the scan
    /// as in flight. Returns the scan id.
    pub async fn start_scan(&self, session: &SharedSession, target: &ScanTarget) -> Uuid {
        let mut context = session.write().await;
        context.push_message(Message::user(target.action_text()));
        let scan_id = context.begin_scan(target);
        debug!("Scan {} registered for {} ({})", scan_id, target.url(), target.scan_type());
        scan_id
    }

    /// Run the pipeline for a scan registered with `start_scan`. Panics and
    /// summarizer failures end in the Failed path; nothing escapes.
    pub async fn run_scan(
        &self,
        session: &SharedSession,
        scan_id: Uuid,
        target: &ScanTarget,
    ) -> ScanOutcome {
        let result = AssertUnwindSafe(self.pipeline(session, scan_id, target))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ScanError::Panicked(panic_message(panic))));

        let mut context = session.write().await;
        match result {
            Ok((report, reply)) => {
                let reply = Message::assistant(reply);
                let report = report.with_raw_output(reply.content.clone());
                context.push_message(reply.clone());
                context.replace_report(report.clone());
                context.set_stage(scan_id, ScanStage::Completed);
                context.finish_scan(scan_id);
                info!(
                    "Scan {} of {} completed with {} severity",
                    scan_id,
                    target.url(),
                    report.overall_severity()
                );
                ScanOutcome::Completed {
                    scan_id,
                    report,
                    reply,
                }
            },
            Err(e) => {
                error!("Scan {} of {} failed: {}", scan_id, target.url(), e);
                let message = Message::assistant(scan_failure_message(target.url()));
                context.set_stage(scan_id, ScanStage::Failed);
                context.push_message(message.clone());
                context.finish_scan(scan_id);
                ScanOutcome::Failed {
                    scan_id,
                    error: e.to_string(),
                    message,
                }
            },
        }
    }

    /// `start_scan` followed by `run_scan`
    pub async fn submit_scan(&self, session: &SharedSession, target: ScanTarget) -> ScanOutcome {
        let scan_id = self.start_scan(session, &target).await;
        self.run_scan(session, scan_id, &target).await
    }

    async fn pipeline(
        &self,
        session: &SharedSession,
        scan_id: Uuid,
        target: &ScanTarget,
    ) -> Result<(AggregatedReport, String), ScanError> {
        let url = target.url();

        let domain = self.domain_analyzer.analyze_domain(url);
        self.advance(session, scan_id, ScanStage::DomainAnalyzed).await;

        let fetched = self.fetcher.fetch(url).await;
        self.advance(session, scan_id, ScanStage::ContentFetched).await;

        let (digest, report) = match &fetched {
            FetchResult::Fetched {
                html,
                certificate_issue,
            } => {
                let finding = self
                    .html_analyzer
                    .analyze(html, url, certificate_issue.as_deref());
                self.advance(session, scan_id, ScanStage::ContentAnalyzed).await;
                build_report(target, &domain, ContentCoverage::Analyzed { finding: &finding, html })
            },
            FetchResult::Failed { error } => {
                warn!("Fetch of {} failed ({}), reduced coverage", url, error);
                self.advance(session, scan_id, ScanStage::FetchFailed).await;
                build_report(target, &domain, ContentCoverage::Unavailable { error })
            },
        };
        self.advance(session, scan_id, ScanStage::DigestBuilt).await;
        debug!("Digest for scan {} is {} characters", scan_id, digest.chars().count());

        let context = AnalysisContext::from_report(&report);
        let transcript = session.read().await.messages().to_vec();
        self.advance(session, scan_id, ScanStage::Summarizing).await;

        let reply = self.summarizer.summarize(&transcript, Some(&context)).await?;
        Ok((report, reply))
    }

    async fn advance(&self, session: &SharedSession, scan_id: Uuid, stage: ScanStage) {
        debug!("Scan {} -> {:?}", scan_id, stage);
        session.write().await.set_stage(scan_id, stage);
    }

    // =============================================================================
    // CHAT
    // =============================================================================

    /// Free-text turn. On summarizer failure the user message stays in the
    /// transcript, no assistant message is added and the error is returned.
    pub async fn send_message(
        &self,
        session: &SharedSession,
        content: &str,
    ) -> Result<Message, ScanError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ScanError::InvalidInput("message is empty".to_string()));
        }

        let transcript = {
            let mut context = session.write().await;
            context.push_message(Message::user(content));
            context.begin_reply();
            context.messages().to_vec()
        };

        let result = AssertUnwindSafe(self.summarizer.summarize(&transcript, None))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(SummarizerError::Request(format!(
                    "provider panicked: {}",
                    panic_message(panic)
                )))
            });

        let mut context = session.write().await;
        context.finish_reply();
        match result {
            Ok(reply) => {
                let message = Message::assistant(reply);
                context.push_message(message.clone());
                Ok(message)
            },
            Err(e) => {
                error!("Summarizer {} failed to reply: {}", self.summarizer.name(), e);
                Err(e.into())
            },
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;
    use crate::models::scan::ScanType;
    use crate::services::session::SessionContext;
    use async_trait::async_trait;

    struct PanickingFetcher;

    #[async_trait]
    impl ContentFetcher for PanickingFetcher {
        async fn fetch(&self, _url: &str) -> FetchResult {
            panic!("fetcher exploded");
        }
    }

    struct StaticFetcher(FetchResult);

    #[async_trait]
    impl ContentFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> FetchResult {
            self.0.clone()
        }
    }

    struct EchoSummarizer;

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(
            &self,
            transcript: &[Message],
            context: Option<&AnalysisContext>,
        ) -> Result<String, SummarizerError> {
            match context {
                Some(c) => Ok(format!("assessed {}", c.url)),
                None => Ok(format!("echo {}", transcript.len())),
            }
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn orchestrator(fetcher: Arc<dyn ContentFetcher>) -> ScanOrchestrator {
        ScanOrchestrator::new(
            DomainAnalyzer::default(),
            HtmlAnalyzer::default(),
            fetcher,
            Arc::new(EchoSummarizer),
        )
    }

    #[tokio::test]
    async fn test_panic_becomes_failed_scan() {
        let orchestrator = orchestrator(Arc::new(PanickingFetcher));
        let session = SessionContext::new().shared();

        let outcome = orchestrator
            .submit_scan(&session, ScanTarget::new("https://example.com", ScanType::Phishing))
            .await;

        match &outcome {
            ScanOutcome::Failed { error, message, .. } => {
                assert!(error.contains("fetcher exploded"));
                assert_eq!(message.content, scan_failure_message("https://example.com"));
            },
            other => panic!("expected failure, got {:?}", other),
        }

        let context = session.read().await;
        assert!(!context.is_scanning());
        assert!(context.current_report().is_none());
        assert_eq!(context.messages().len(), 2);
        assert_eq!(context.messages()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_completed_scan_sets_report_and_reply() {
        let orchestrator = orchestrator(Arc::new(StaticFetcher(FetchResult::fetched(
            "<html><body><p>Hello</p></body></html>",
        ))));
        let session = SessionContext::new().shared();

        let outcome = orchestrator
            .submit_scan(&session, ScanTarget::new("https://example.com", ScanType::Phishing))
            .await;
        assert!(outcome.is_completed());

        let context = session.read().await;
        let report = context.current_report().unwrap();
        assert_eq!(report.raw_output, "assessed https://example.com");
        assert_eq!(context.messages()[0].content, "Scan https://example.com for phishing");
        assert!(!context.is_scanning());
    }

    #[tokio::test]
    async fn test_empty_chat_message_rejected() {
        let orchestrator = orchestrator(Arc::new(PanickingFetcher));
        let session = SessionContext::new().shared();

        let result = orchestrator.send_message(&session, "   ").await;
        assert!(matches!(result, Err(ScanError::InvalidInput(_))));
        assert!(session.read().await.messages().is_empty());
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic");
    }
}
