// ZDB-31: Page retrieval for the content analysis stage
// Every failure is flattened into FetchResult::Failed with a short reason

use async_trait::async_trait;
use reqwest::{
    dns::{Addrs, Name, Resolve, Resolving},
    redirect::Policy,
    Client,
};
use std::error::Error as StdError;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::{Host, Url};

use crate::models::scan::FetchResult;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL")]
    InvalidUrl,

    #[error("private network address")]
    PrivateNetwork,

    #[error("timeout")]
    Timeout,

    #[error("connection failed")]
    Connect,

    #[error("TLS/certificate error")]
    Tls(String),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("request failed")]
    Request(String),

    #[error("HTTP client could not be built: {0}")]
    ClientBuild(String),
}

/// Raised from DNS resolution and redirect checks when a hop lands on a
/// loopback, private or link-local address
#[derive(Debug, Error)]
#[error("private network address")]
struct BlockedAddress;

/// Retrieves the markup behind a URL. Implementations never fail outright;
/// problems are reported through `FetchResult::Failed`.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

#[derive(Debug, Clone)]
pub struct ContentFetcherConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub max_body_bytes: usize,
    pub user_agent: String,
    /// Retry TLS failures with certificate checks off and report the issue
    pub allow_invalid_cert_fallback: bool,
    /// Permit loopback, private and link-local targets (local testing only)
    pub allow_private_networks: bool,
}

impl Default for ContentFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            max_body_bytes: 2 * 1024 * 1024,
            user_agent: "ZeroDay-Scanner/1.0".to_string(),
            allow_invalid_cert_fallback: true,
            allow_private_networks: false,
        }
    }
}

// =============================================================================
// HTTP FETCHER
// =============================================================================

pub struct HttpContentFetcher {
    client: Client,
    /// Only built when the invalid-certificate fallback is enabled
    insecure_client: Option<Client>,
    config: ContentFetcherConfig,
}

impl HttpContentFetcher {
    pub fn new(config: ContentFetcherConfig) -> Result<Self, FetchError> {
        let client = build_client(&config, false)?;
        let insecure_client = if config.allow_invalid_cert_fallback {
            Some(build_client(&config, true)?)
        } else {
            None
        };

        Ok(Self {
            client,
            insecure_client,
            config,
        })
    }

    async fn fetch_with(&self, client: &Client, url: &Url) -> Result<String, FetchError> {
        let mut response = client.get(url.clone()).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let cap = self.config.max_body_bytes;
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            let room = cap.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= cap {
                debug!("Body of {} truncated at {} bytes", url, cap);
                break;
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let target = match normalize_target(url) {
            Ok(target) => target,
            Err(e) => return FetchResult::failed(e.to_string()),
        };
        if !self.config.allow_private_networks && is_private_target(&target) {
            warn!("Refusing to fetch {}: private network address", target);
            return FetchResult::failed(FetchError::PrivateNetwork.to_string());
        }

        match self.fetch_with(&self.client, &target).await {
            Ok(html) => FetchResult::fetched(html),
            Err(FetchError::Tls(detail)) => {
                let Some(insecure) = &self.insecure_client else {
                    return FetchResult::failed(FetchError::Tls(detail).to_string());
                };
                warn!(
                    "Certificate validation failed for {} ({}), retrying without verification",
                    target, detail
                );
                match self.fetch_with(insecure, &target).await {
                    Ok(html) => FetchResult::Fetched {
                        html,
                        certificate_issue: Some(format!(
                            "certificate could not be verified ({})",
                            detail
                        )),
                    },
                    Err(e) => FetchResult::failed(e.to_string()),
                }
            },
            Err(e) => {
                debug!("Fetch of {} failed: {:?}", target, e);
                FetchResult::failed(e.to_string())
            },
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn build_client(config: &ContentFetcherConfig, accept_invalid_certs: bool) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .redirect(redirect_policy(config.max_redirects, config.allow_private_networks))
        .danger_accept_invalid_certs(accept_invalid_certs);

    if !config.allow_private_networks {
        builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
    }

    builder
        .build()
        .map_err(|e| FetchError::ClientBuild(e.to_string()))
}

/// Same limit as `Policy::limited`, plus a private-address check on every hop
fn redirect_policy(max_redirects: usize, allow_private_networks: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() > max_redirects {
            attempt.error("too many redirects")
        } else if !allow_private_networks && is_private_target(attempt.url()) {
            attempt.error(BlockedAddress)
        } else {
            attempt.follow()
        }
    })
}

// =============================================================================
// PRIVATE NETWORK GUARD
// =============================================================================

/// Resolver that fails when any address behind a name is non-public, so
/// hostnames pointing at internal services are refused on every hop.
struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await?
                .collect();
            if !all_public(&addrs) {
                debug!("{} resolves to a private network address", host);
                return Err(Box::new(BlockedAddress) as Box<dyn StdError + Send + Sync>);
            }
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

fn all_public(addrs: &[SocketAddr]) -> bool {
    !addrs.is_empty() && addrs.iter().all(|a| !is_private_ip(a.ip()))
}

/// Loopback, RFC 1918, link-local (cloud metadata), CGNAT and unspecified
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || octets[0] == 0
                || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        },
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
                || v6.to_ipv4_mapped().map(|v4| is_private_ip(IpAddr::V4(v4))).unwrap_or(false)
        },
    }
}

/// Literal private addresses and local-only host names. Names that resolve
/// privately are caught later by the resolver.
pub fn is_private_target(url: &Url) -> bool {
    match url.host() {
        Some(Host::Ipv4(ip)) => is_private_ip(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_private_ip(IpAddr::V6(ip)),
        Some(Host::Domain(domain)) => {
            let domain = domain.trim_end_matches('.').to_lowercase();
            domain == "localhost"
                || [".localhost", ".local", ".internal"]
                    .iter()
                    .any(|suffix| domain.ends_with(suffix))
        },
        None => true,
    }
}

/// Accepts bare hosts by assuming https
pub fn normalize_target(url: &str) -> Result<Url, FetchError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl);
    }

    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", trimmed)).map_err(|_| FetchError::InvalidUrl)?
        },
        Err(_) => return Err(FetchError::InvalidUrl),
    };

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
        return Err(FetchError::InvalidUrl);
    }
    Ok(parsed)
}

fn classify(err: reqwest::Error) -> FetchError {
    if hit_blocked_address(&err) {
        FetchError::PrivateNetwork
    } else if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_redirect() {
        FetchError::TooManyRedirects
    } else if let Some(detail) = tls_failure(&err) {
        FetchError::Tls(detail)
    } else if err.is_connect() {
        FetchError::Connect
    } else if err.is_builder() {
        FetchError::InvalidUrl
    } else if let Some(status) = err.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Request(err.to_string())
    }
}

fn hit_blocked_address(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(cause) = source {
        if cause.downcast_ref::<BlockedAddress>().is_some()
            || cause.to_string() == BlockedAddress.to_string()
        {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Innermost error message when the cause chain points at TLS
fn tls_failure(err: &reqwest::Error) -> Option<String> {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    let mut found = None;
    while let Some(cause) = source {
        let text = cause.to_string();
        let lower = text.to_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|m| lower.contains(m))
        {
            found = Some(text);
        }
        source = cause.source();
    }
    found
}
