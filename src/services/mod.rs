// Services module for the ZeroDay backend
// Scan pipeline, providers and session state

pub mod content_fetcher;
pub mod report_builder;
pub mod scan_orchestrator;
pub mod session;
pub mod summarizer;

// Re-export commonly used services
pub use content_fetcher::{ContentFetcher, ContentFetcherConfig, FetchError, HttpContentFetcher};
pub use report_builder::{build_report, html_excerpt, ContentCoverage, HTML_EXCERPT_CHARS};
pub use scan_orchestrator::{scan_failure_message, ScanError, ScanOrchestrator, ScanOutcome};
pub use session::{
    InFlightScan, ScanStage, SessionContext, SessionError, SessionLimits, SessionSnapshot,
    SessionStore, SharedSession,
};
pub use summarizer::{
    AnalysisContext, GeminiSummarizer, RuleBasedSummarizer, Summarizer, SummarizerError,
    SYSTEM_PROMPT,
};
