// ZDB-33: Report aggregation
// Merges domain and content findings into the digest text and the inspector report

use chrono::Utc;
use uuid::Uuid;

use crate::models::report::{AggregatedReport, Coverage, Finding, Severity};
use crate::models::scan::{ContentCategory, ContentFinding, DomainFinding, ScanTarget};

/// Markup characters quoted in the digest
pub const HTML_EXCERPT_CHARS: usize = 3000;

const FULL_COVERAGE_CONFIDENCE: f32 = 0.85;
const DOMAIN_ONLY_CONFIDENCE: f32 = 0.6;

pub const DOMAIN_FINDING_ID: &str = "domain-analysis";

/// What the content stage produced for this scan
#[derive(Debug, Clone, Copy)]
pub enum ContentCoverage<'a> {
    Analyzed {
        finding: &'a ContentFinding,
        html: &'a str,
    },
    Unavailable {
        error: &'a str,
    },
}

/// Build the digest and report for one scan. A fetch failure only reduces
/// coverage; it never adds a finding of its own.
pub fn build_report(
    target: &ScanTarget,
    domain: &DomainFinding,
    coverage: ContentCoverage<'_>,
) -> (String, AggregatedReport) {
    let digest = build_digest(target, domain, coverage);

    let mut findings = vec![domain_record(domain)];
    let (coverage_kind, confidence) = match coverage {
        ContentCoverage::Analyzed { finding, .. } => {
            findings.extend(
                finding
                    .detected()
                    .map(|(category, f)| content_record(category, &f.details)),
            );
            (Coverage::Full, FULL_COVERAGE_CONFIDENCE)
        },
        ContentCoverage::Unavailable { .. } => (Coverage::DomainOnly, DOMAIN_ONLY_CONFIDENCE),
    };

    let report = AggregatedReport {
        id: Uuid::new_v4(),
        url: target.url().to_string(),
        scan_type: target.scan_type(),
        summary: digest.clone(),
        confidence,
        findings,
        coverage: coverage_kind,
        timestamp: Utc::now(),
        raw_output: String::new(),
    };

    (digest, report)
}

// =============================================================================
// DIGEST
// =============================================================================

fn build_digest(target: &ScanTarget, domain: &DomainFinding, coverage: ContentCoverage<'_>) -> String {
    let mut digest = format!("**URL:** {}\n\n", target.url());

    digest.push_str("**DOMAIN ANALYSIS:**\n");
    if domain.is_suspicious {
        digest.push_str("🔴 Suspicious domain detected:\n");
        for reason in &domain.reasons {
            digest.push_str(&format!("- {}\n", reason));
        }
        digest.push('\n');
    } else {
        digest.push_str("✅ Domain structure appears legitimate\n\n");
    }

    if let Some(brand) = &domain.brand_impersonation {
        digest.push_str(&format!(
            "🔴 **BRAND IMPERSONATION ALERT:** Possible {} impersonation ({}% confidence)\n\n",
            brand.brand, brand.confidence
        ));
    }

    match coverage {
        ContentCoverage::Unavailable { error } => {
            digest.push_str(&format!(
                "**CONTENT FETCH ERROR:** Could not fetch website content - {}\n",
                error
            ));
            digest.push_str("Only the URL structure could be analyzed.\n");
        },
        ContentCoverage::Analyzed { finding, html } => {
            digest.push_str("**CONTENT ANALYSIS:**\n");
            for (category, f) in finding.detected() {
                let marker = match category_severity(category) {
                    Severity::High => "🔴",
                    _ => "⚠️",
                };
                digest.push_str(&format!("{} {}: {}\n", marker, category.title(), f.details));
            }
            if !finding.any_detected() {
                digest.push_str("✅ No immediate threats detected in website content\n");
            }

            digest.push_str(&format!(
                "\n**HTML CONTENT SAMPLE:**\n```html\n{}\n```\n",
                html_excerpt(html)
            ));
        },
    }

    digest
}

/// First `HTML_EXCERPT_CHARS` characters of the markup, unmodified
pub fn html_excerpt(html: &str) -> &str {
    match html.char_indices().nth(HTML_EXCERPT_CHARS) {
        Some((cut, _)) => &html[..cut],
        None => html,
    }
}

// =============================================================================
// FINDING RECORDS
// =============================================================================

fn domain_record(domain: &DomainFinding) -> Finding {
    let confidence = if domain.brand_impersonation.is_some() {
        95
    } else if domain.is_suspicious {
        80
    } else {
        20
    };

    let (severity, fix) = if domain.is_suspicious {
        (
            Severity::High,
            "Avoid this website - domain shows signs of malicious intent",
        )
    } else {
        (Severity::Low, "Domain appears safe")
    };

    Finding {
        id: DOMAIN_FINDING_ID.to_string(),
        title: "Domain Analysis".to_string(),
        severity,
        confidence,
        evidence: domain.reasons.join(", "),
        fix: fix.to_string(),
        category: None,
    }
}

fn category_severity(category: ContentCategory) -> Severity {
    match category {
        ContentCategory::SuspiciousLinks => Severity::Medium,
        _ => Severity::High,
    }
}

fn content_record(category: ContentCategory, details: &str) -> Finding {
    let (confidence, fix) = match category {
        ContentCategory::SuspiciousForms => (
            85,
            "Do not submit credentials or payment data through this page",
        ),
        ContentCategory::SuspiciousLinks => (
            65,
            "Check where links lead before following them",
        ),
        ContentCategory::SuspiciousScripts => (
            75,
            "Treat the page as untrusted; obfuscated or third-party scripts may harvest input",
        ),
        ContentCategory::SslIssues => (
            80,
            "Only use the site over a valid HTTPS connection with no insecure resources",
        ),
        ContentCategory::BrandImpersonation => (
            90,
            "Sign in only through the brand's official domain",
        ),
    };

    Finding {
        id: format!("content-{}", category.slug()),
        title: category.title().to_string(),
        severity: category_severity(category),
        confidence,
        evidence: details.to_string(),
        fix: fix.to_string(),
        category: Some(category),
    }
}
