// Centralized configuration management for the ZeroDay backend
// Every env var is read ONCE at startup; no variable is mandatory

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::services::content_fetcher::ContentFetcherConfig;
use crate::services::session::SessionLimits;
use crate::utils::domain_analyzer::DomainAnalyzerConfig;
use crate::utils::html_analyzer::HtmlAnalyzerConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scanner: ScannerConfig,
    pub summarizer: SummarizerConfig,
    pub session: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub rust_log: String,
    pub cors_allowed_origins: Vec<String>,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Fetch limits and analyzer thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub fetch_timeout_secs: u64,
    pub max_redirects: usize,
    pub max_body_bytes: usize,
    pub user_agent: String,
    pub allow_invalid_cert_fallback: bool,
    pub allow_private_networks: bool,
    pub max_subdomain_depth: usize,
    pub brand_similarity_threshold: f64,
    pub external_link_ratio: f64,
    pub cdn_allowlist: Vec<String>,
}

/// In-memory session retention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub idle_ttl_secs: u64,
    pub max_sessions: usize,
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Summarizer provider selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SummarizerProvider {
    Gemini,
    RuleBased,
}

impl From<String> for SummarizerProvider {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "gemini" => SummarizerProvider::Gemini,
            "rule-based" | "rule_based" | "offline" => SummarizerProvider::RuleBased,
            _ => SummarizerProvider::Gemini,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub provider: SummarizerProvider,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl SummarizerConfig {
    /// Gemini is only used when it was selected and a key is present
    pub fn effective_provider(&self) -> SummarizerProvider {
        match (&self.provider, &self.api_key) {
            (SummarizerProvider::Gemini, Some(key)) if !key.trim().is_empty() => {
                SummarizerProvider::Gemini
            },
            _ => SummarizerProvider::RuleBased,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Helper function to get optional env var with default
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).trim().parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_usize_or_default = |key: &str, default: &str| -> Result<usize, ConfigError> {
            get_or_default(key, default).trim().parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid usize".to_string())
            })
        };

        let parse_ratio_or_default = |key: &str, default: &str| -> Result<f64, ConfigError> {
            let value: f64 = get_or_default(key, default).trim().parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid number".to_string())
            })?;
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    "must be between 0 and 1".to_string(),
                ));
            }
            Ok(value)
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        let parse_list = |key: &str, default: &str| -> Vec<String> {
            get_or_default(key, default)
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        // Parse bind address to extract port
        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:8080");
        let port = bind_address
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let server = ServerConfig {
            bind_address,
            port,
            environment: Environment::from(get_or_default("ENVIRONMENT", "development")),
            rust_log: get_or_default("RUST_LOG", "zeroday_backend_core=debug,tower_http=info"),
            cors_allowed_origins: get_or_default("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        };

        let default_cdns = HtmlAnalyzerConfig::default().cdn_allowlist.join(",");
        let scanner = ScannerConfig {
            fetch_timeout_secs: parse_u64_or_default("SCANNER_FETCH_TIMEOUT", "10")?,
            max_redirects: parse_usize_or_default("SCANNER_MAX_REDIRECTS", "5")?,
            max_body_bytes: parse_usize_or_default("SCANNER_MAX_BODY_BYTES", "2097152")?,
            user_agent: get_or_default("SCANNER_USER_AGENT", "ZeroDay-Scanner/1.0"),
            allow_invalid_cert_fallback: parse_bool_or_default(
                "SCANNER_ALLOW_INVALID_CERT_FALLBACK",
                "true",
            ),
            allow_private_networks: parse_bool_or_default(
                "SCANNER_ALLOW_PRIVATE_NETWORKS",
                "false",
            ),
            max_subdomain_depth: parse_usize_or_default("SCANNER_MAX_SUBDOMAIN_DEPTH", "3")?,
            brand_similarity_threshold: parse_ratio_or_default(
                "SCANNER_BRAND_SIMILARITY_THRESHOLD",
                "0.8",
            )?,
            external_link_ratio: parse_ratio_or_default("SCANNER_EXTERNAL_LINK_RATIO", "0.6")?,
            cdn_allowlist: parse_list("SCANNER_CDN_ALLOWLIST", &default_cdns),
        };

        let summarizer = SummarizerConfig {
            provider: SummarizerProvider::from(get_or_default("SUMMARIZER_PROVIDER", "gemini")),
            api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            model: get_or_default("GEMINI_MODEL", "gemini-1.5-flash"),
            api_base_url: get_or_default(
                "GEMINI_API_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            timeout_secs: parse_u64_or_default("SUMMARIZER_TIMEOUT", "60")?,
        };

        let session = SessionConfig {
            idle_ttl_secs: parse_u64_or_default("SESSION_IDLE_TTL", "3600")?,
            max_sessions: parse_usize_or_default("SESSION_MAX_COUNT", "10000")?,
            sweep_interval_secs: parse_u64_or_default("SESSION_SWEEP_INTERVAL", "60")?,
        };

        Ok(AppConfig {
            server,
            scanner,
            summarizer,
            session,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.server.environment == Environment::Production
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.server.environment == Environment::Development
    }
}

// =============================================================================
// ANALYZER / FETCHER SETTINGS
// =============================================================================

impl From<&ScannerConfig> for DomainAnalyzerConfig {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            max_subdomain_depth: config.max_subdomain_depth,
            brand_similarity_threshold: config.brand_similarity_threshold,
        }
    }
}

impl From<&ScannerConfig> for HtmlAnalyzerConfig {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            external_link_ratio: config.external_link_ratio,
            cdn_allowlist: config.cdn_allowlist.clone(),
            ..Default::default()
        }
    }
}

impl From<&ScannerConfig> for ContentFetcherConfig {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            max_redirects: config.max_redirects,
            max_body_bytes: config.max_body_bytes,
            user_agent: config.user_agent.clone(),
            allow_invalid_cert_fallback: config.allow_invalid_cert_fallback,
            allow_private_networks: config.allow_private_networks,
        }
    }
}

impl From<&SessionConfig> for SessionLimits {
    fn from(config: &SessionConfig) -> Self {
        Self {
            idle_ttl: Duration::from_secs(config.idle_ttl_secs),
            max_sessions: config.max_sessions,
        }
    }
}

/// Get the global configuration instance
/// This is the primary way to access configuration throughout the app
pub fn config() -> &'static AppConfig {
    &CONFIG
}
