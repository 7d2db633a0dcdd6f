// ZDB-14: Aggregated security report shown in the inspector panel

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::scan::{ContentCategory, ScanType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// How much of the page the report could look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Full,
    DomainOnly,
}

/// One severity-rated observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub severity: Severity,
    /// 0-100
    pub confidence: u8,
    pub evidence: String,
    pub fix: String,
    /// Set on records derived from page content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ContentCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub id: Uuid,
    pub url: String,
    pub scan_type: ScanType,
    /// The formatted digest handed to the summarizer
    pub summary: String,
    /// 0.0-1.0
    pub confidence: f32,
    pub findings: Vec<Finding>,
    pub coverage: Coverage,
    pub timestamp: DateTime<Utc>,
    /// Summarizer output, filled in once the assessment arrives
    pub raw_output: String,
}

impl AggregatedReport {
    /// Highest severity across all findings
    pub fn overall_severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|f| f.severity)
            .max()
            .unwrap_or(Severity::Low)
    }

    pub fn with_raw_output(mut self, raw_output: impl Into<String>) -> Self {
        self.raw_output = raw_output.into();
        self
    }

    pub fn finding(&self, id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == id)
    }
}
