// Utility modules for the ZeroDay backend

pub mod brand_catalog;
pub mod domain_analyzer;
pub mod html_analyzer;
pub mod service_error;

pub use brand_catalog::{find_brand, registrable_domain, Brand, BRANDS};
pub use domain_analyzer::{analyze_domain, DomainAnalyzer, DomainAnalyzerConfig};
pub use html_analyzer::{analyze_html, HtmlAnalyzer, HtmlAnalyzerConfig};
pub use service_error::ServiceError;
