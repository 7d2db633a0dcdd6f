// Data models for the ZeroDay backend

pub mod message;
pub mod report;
pub mod scan;

pub use message::{Message, Role, SendMessageRequest};
pub use report::{AggregatedReport, Coverage, Finding, Severity};
pub use scan::{
    BrandImpersonation, CategoryFinding, ContentCategory, ContentFinding, CreateScanRequest,
    DomainFinding, FetchResult, ScanAccepted, ScanTarget, ScanType,
};
