// ZDB-12: Scan request and analyzer finding models
// Everything produced by the analyzers before aggregation lives here

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

// =============================================================================
// SCAN TARGET
// =============================================================================

/// Declared intent of a scan. Both run the same pipeline; the intent only
/// changes how the request is phrased to the summarizer and in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    #[default]
    Phishing,
    Passive,
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanType::Phishing => write!(f, "phishing"),
            ScanType::Passive => write!(f, "passive"),
        }
    }
}

/// A submitted URL plus its scan intent. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    url: String,
    scan_type: ScanType,
}

impl ScanTarget {
    pub fn new(url: impl Into<String>, scan_type: ScanType) -> Self {
        Self {
            url: url.into().trim().to_string(),
            scan_type,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    /// Short human-facing action shown in the transcript in place of the
    /// machine-generated analysis prompt.
    pub fn action_text(&self) -> String {
        match self.scan_type {
            ScanType::Phishing => format!("Scan {} for phishing", self.url),
            ScanType::Passive => format!("Scan {} for security issues", self.url),
        }
    }
}

/// Body of `POST /api/v1/sessions/{id}/scans`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateScanRequest {
    #[validate(length(min = 1, max = 2048, message = "URL must be between 1 and 2048 characters"))]
    pub url: String,
    #[serde(default)]
    pub scan_type: ScanType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAccepted {
    pub scan_id: Uuid,
    pub url: String,
    pub scan_type: ScanType,
}

// =============================================================================
// DOMAIN FINDING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandImpersonation {
    /// Display name of the impersonated brand
    pub brand: String,
    /// 0-100
    pub confidence: u8,
}

/// Result of the textual URL heuristics. Produced once per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainFinding {
    pub is_suspicious: bool,
    pub reasons: Vec<String>,
    pub brand_impersonation: Option<BrandImpersonation>,
}

impl DomainFinding {
    pub fn clean() -> Self {
        Self {
            is_suspicious: false,
            reasons: Vec::new(),
            brand_impersonation: None,
        }
    }

    /// A finding for input that could not be analyzed structurally.
    pub fn unparseable(reason: impl Into<String>) -> Self {
        Self {
            is_suspicious: true,
            reasons: vec![reason.into()],
            brand_impersonation: None,
        }
    }
}

// =============================================================================
// FETCH RESULT
// =============================================================================

/// Outcome of fetching the target page. Exactly one of markup or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    Fetched {
        html: String,
        /// Set when the page was only reachable with certificate checks off
        certificate_issue: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl FetchResult {
    pub fn fetched(html: impl Into<String>) -> Self {
        FetchResult::Fetched {
            html: html.into(),
            certificate_issue: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        FetchResult::Failed {
            error: error.into(),
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            FetchResult::Fetched { html, .. } => Some(html),
            FetchResult::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchResult::Fetched { .. } => None,
            FetchResult::Failed { error } => Some(error),
        }
    }

    pub fn certificate_issue(&self) -> Option<&str> {
        match self {
            FetchResult::Fetched {
                certificate_issue, ..
            } => certificate_issue.as_deref(),
            FetchResult::Failed { .. } => None,
        }
    }
}

// =============================================================================
// CONTENT FINDING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    SuspiciousForms,
    SuspiciousLinks,
    SuspiciousScripts,
    SslIssues,
    BrandImpersonation,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 5] = [
        ContentCategory::SuspiciousForms,
        ContentCategory::SuspiciousLinks,
        ContentCategory::SuspiciousScripts,
        ContentCategory::SslIssues,
        ContentCategory::BrandImpersonation,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ContentCategory::SuspiciousForms => "Suspicious Forms",
            ContentCategory::SuspiciousLinks => "Suspicious Links",
            ContentCategory::SuspiciousScripts => "Suspicious Scripts",
            ContentCategory::SslIssues => "SSL / Mixed Content",
            ContentCategory::BrandImpersonation => "Brand Impersonation (Page Content)",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ContentCategory::SuspiciousForms => "forms",
            ContentCategory::SuspiciousLinks => "links",
            ContentCategory::SuspiciousScripts => "scripts",
            ContentCategory::SslIssues => "ssl",
            ContentCategory::BrandImpersonation => "brand-impersonation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryFinding {
    pub detected: bool,
    /// Empty when nothing was detected
    pub details: String,
}

impl CategoryFinding {
    /// `detected` is the OR of the sub-checks that produced a reason.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            return Self::default();
        }
        Self {
            detected: true,
            details: reasons.join("; "),
        }
    }
}

/// Per-category verdicts from the page markup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentFinding {
    pub suspicious_forms: CategoryFinding,
    pub suspicious_links: CategoryFinding,
    pub suspicious_scripts: CategoryFinding,
    pub ssl_issues: CategoryFinding,
    pub brand_impersonation: CategoryFinding,
}

impl ContentFinding {
    pub fn get(&self, category: ContentCategory) -> &CategoryFinding {
        match category {
            ContentCategory::SuspiciousForms => &self.suspicious_forms,
            ContentCategory::SuspiciousLinks => &self.suspicious_links,
            ContentCategory::SuspiciousScripts => &self.suspicious_scripts,
            ContentCategory::SslIssues => &self.ssl_issues,
            ContentCategory::BrandImpersonation => &self.brand_impersonation,
        }
    }

    /// Detected categories in the fixed reporting order
    pub fn detected(&self) -> impl Iterator<Item = (ContentCategory, &CategoryFinding)> {
        ContentCategory::ALL
            .into_iter()
            .map(move |c| (c, self.get(c)))
            .filter(|(_, f)| f.detected)
    }

    pub fn any_detected(&self) -> bool {
        self.detected().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_reasons() {
        let empty = CategoryFinding::from_reasons(vec![]);
        assert!(!empty.detected);
        assert!(empty.details.is_empty());

        let hit = CategoryFinding::from_reasons(vec!["a".to_string(), "b".to_string()]);
        assert!(hit.detected);
        assert_eq!(hit.details, "a; b");
    }

    #[test]
    fn test_detected_keeps_category_order() {
        let finding = ContentFinding {
            ssl_issues: CategoryFinding::from_reasons(vec!["mixed".to_string()]),
            suspicious_forms: CategoryFinding::from_reasons(vec!["form".to_string()]),
            ..Default::default()
        };
        let order: Vec<_> = finding.detected().map(|(c, _)| c).collect();
        assert_eq!(
            order,
            vec![ContentCategory::SuspiciousForms, ContentCategory::SslIssues]
        );
    }

    #[test]
    fn test_fetch_result_accessors() {
        let ok = FetchResult::fetched("<html></html>");
        assert_eq!(ok.html(), Some("<html></html>"));
        assert!(ok.error().is_none());

        let failed = FetchResult::failed("timeout");
        assert!(failed.html().is_none());
        assert_eq!(failed.error(), Some("timeout"));
    }

    #[test]
    fn test_scan_target_action_text() {
        let target = ScanTarget::new("  https://example.com ", ScanType::Passive);
        assert_eq!(target.url(), "https://example.com");
        assert_eq!(
            target.action_text(),
            "Scan https://example.com for security issues"
        );
    }
}
