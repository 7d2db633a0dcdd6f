// ZDB-21: Textual URL heuristics (typosquatting and brand lookalikes)
// No network access; every input produces a finding, never an error

use lazy_static::lazy_static;
use regex::Regex;
use std::net::IpAddr;
use strsim::{levenshtein, normalized_levenshtein};
use tracing::debug;
use url::{Host, Url};

use crate::models::scan::{BrandImpersonation, DomainFinding};
use crate::utils::brand_catalog::{registrable_domain, suffix_label_count, Brand, BRANDS};

// =============================================================================
// STATIC PATTERNS
// =============================================================================

lazy_static! {
    /// Bare host-like input that gets an implicit https:// scheme
    static ref DOMAIN_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*\.)+[a-zA-Z]{2,}(:\d+)?(/.*)?$")
            .expect("Invalid domain pattern regex");

    /// Bare dotted-quad input, also given an implicit scheme
    static ref BARE_IPV4_PATTERN: Regex =
        Regex::new(r"^(\d{1,3}\.){3}\d{1,3}(:\d+)?(/.*)?$").expect("Invalid IPv4 pattern regex");
}

// =============================================================================
// CONSTANTS
// =============================================================================

const HIGH_ABUSE_TLDS: &[&str] = &[
    "tk", "ml", "ga", "cf", "gq", "click", "download", "zip", "top", "xyz", "work", "loan",
    "men", "stream", "country", "kim", "review", "rest", "fit", "support",
];

const PHISHING_KEYWORDS: &[&str] = &[
    "verify", "secure", "login", "signin", "account", "update", "confirm", "banking", "wallet",
    "unlock", "suspended", "billing", "recovery",
];

/// Well under the 2048-character request cap so the check can fire
const MAX_ANALYZED_URL_LENGTH: usize = 512;
const MIN_TOKEN_LENGTH: usize = 3;
const EXCESSIVE_HYPHENS: usize = 4;
/// Bait words glued onto a brand name, beyond the phishing keywords
const LURE_WORDS: &[&str] = &[
    "help", "support", "service", "online", "id", "pay", "auth", "web", "mail", "team",
    "center", "alert", "security", "access", "portal", "user", "customer",
];
const MIN_WRAPPED_BRAND_LENGTH: usize = 4;
/// Similarity credited to a brand name glued to lure words (`paypalsecure`)
const CONTAINMENT_SIMILARITY: f64 = 0.9;
/// Confidence points lost per raw edit between token and brand
const EDIT_DISTANCE_PENALTY: f64 = 5.0;

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Debug, Clone)]
pub struct DomainAnalyzerConfig {
    /// Subdomain levels above the registrable domain tolerated before flagging
    pub max_subdomain_depth: usize,
    /// Normalised similarity (0-1) at which a token counts as brand-like
    pub brand_similarity_threshold: f64,
}

impl Default for DomainAnalyzerConfig {
    fn default() -> Self {
        Self {
            max_subdomain_depth: 3,
            brand_similarity_threshold: 0.8,
        }
    }
}

// =============================================================================
// DOMAIN ANALYZER
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct BrandMatch {
    brand: &'static Brand,
    similarity: f64,
    distance: usize,
}

impl BrandMatch {
    /// Rises with similarity, falls with the raw edit distance
    fn confidence(&self) -> u8 {
        let score = self.similarity * 100.0 - self.distance as f64 * EDIT_DISTANCE_PENALTY;
        score.round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomainAnalyzer {
    config: DomainAnalyzerConfig,
}

impl DomainAnalyzer {
    pub fn new(config: DomainAnalyzerConfig) -> Self {
        Self { config }
    }

    /// Inspect the URL's textual structure. Malformed input yields a
    /// suspicious finding carrying the parse failure as its reason.
    pub fn analyze_domain(&self, url: &str) -> DomainFinding {
        let parsed = match parse_target(url) {
            Ok(parsed) => parsed,
            Err(reason) => {
                debug!("Domain analysis could not parse {:?}: {}", url, reason);
                return DomainFinding::unparseable(reason);
            },
        };

        let mut reasons = Vec::new();

        if url.len() > MAX_ANALYZED_URL_LENGTH {
            reasons.push(format!(
                "URL is unusually long ({} characters)",
                url.len()
            ));
        }

        if !matches!(parsed.scheme(), "http" | "https") {
            reasons.push(format!("Non-web scheme '{}'", parsed.scheme()));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            reasons.push(
                "URL embeds credentials before the host, hiding the real destination".to_string(),
            );
        }

        let host = match parsed.host() {
            None => {
                reasons.push("URL has no host component".to_string());
                return finish(reasons, None);
            },
            Some(Host::Ipv4(ip)) => {
                reasons.push(format!("Host is a raw IP address ({})", ip));
                return finish(reasons, None);
            },
            Some(Host::Ipv6(ip)) => {
                reasons.push(format!("Host is a raw IP address ({})", ip));
                return finish(reasons, None);
            },
            Some(Host::Domain(domain)) => domain.to_lowercase(),
        };

        // Opaque hosts of non-special schemes are never parsed as IPs by `url`
        if let Ok(ip) = host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
            reasons.push(format!("Host is a raw IP address ({})", ip));
            return finish(reasons, None);
        }

        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        let brand_match = self.inspect_host(&host, &mut reasons);

        let impersonation = brand_match.map(|m| {
            let confidence = m.confidence();
            reasons.push(format!(
                "Hostname resembles {} ({}% confidence) but is not served from {}",
                m.brand.display_name, confidence, m.brand.canonical_domains[0]
            ));
            BrandImpersonation {
                brand: m.brand.display_name.to_string(),
                confidence,
            }
        });

        finish(reasons, impersonation)
    }

    /// Run every host indicator, appending reasons; returns the best brand match.
    fn inspect_host(&self, host: &str, reasons: &mut Vec<String>) -> Option<BrandMatch> {
        let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
        if labels.is_empty() {
            reasons.push("URL has an empty hostname".to_string());
            return None;
        }

        let registrable = registrable_domain(host);
        let suffix_labels = suffix_label_count(host).min(labels.len() - 1);
        let name_labels = &labels[..labels.len() - suffix_labels];

        // 1. Subdomain depth
        let depth = name_labels.len().saturating_sub(1);
        if depth > self.config.max_subdomain_depth {
            reasons.push(format!("Excessive subdomain depth ({} levels)", depth));
        }

        // 2. TLD reputation
        if suffix_labels > 0 {
            if let Some(tld) = labels.last() {
                if HIGH_ABUSE_TLDS.contains(tld) {
                    reasons.push(format!("High-abuse TLD '.{}'", tld));
                }
            }
        }

        // 3. Punycode / homoglyphs
        for label in &labels {
            if label.starts_with("xn--") {
                reasons.push(format!(
                    "Punycode label '{}' may hide homoglyph characters",
                    label
                ));
            }
        }

        // 4. Hyphenation
        let hyphens: usize = name_labels.iter().map(|l| l.matches('-').count()).sum();
        if hyphens >= EXCESSIVE_HYPHENS {
            reasons.push(format!("Excessive hyphenation ({} hyphens)", hyphens));
        }

        let tokens: Vec<&str> = name_labels
            .iter()
            .flat_map(|l| l.split('-'))
            .filter(|t| !t.is_empty())
            .collect();

        let owned_by_brand = BRANDS.iter().any(|b| b.owns_domain(&registrable));

        // 5. Phishing vocabulary, ignored on domains a catalogued brand owns
        if !owned_by_brand {
            for keyword in PHISHING_KEYWORDS {
                if tokens.iter().any(|t| t.contains(keyword)) {
                    reasons.push(format!("Phishing keyword '{}' in hostname", keyword));
                }
            }
        }

        // 6. Character substitution in brand-like tokens
        for token in &tokens {
            if !token.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            if let Some(m) = self.match_brand(token, &registrable) {
                reasons.push(format!(
                    "Digit substitution in '{}' imitates '{}'",
                    token, m.brand.name
                ));
            }
        }

        for label in name_labels.iter().filter(|l| l.contains('-')) {
            let brand_part = label
                .split('-')
                .filter(|p| !p.is_empty())
                .find(|p| self.match_brand(p, &registrable).is_some());
            if let Some(part) = brand_part {
                reasons.push(format!(
                    "Hyphenated label '{}' wraps brand-like token '{}'",
                    label, part
                ));
            }
        }

        // 7. Brand impersonation over tokens and de-hyphenated labels
        let joined: Vec<String> = name_labels
            .iter()
            .filter(|l| l.contains('-'))
            .map(|l| l.replace('-', ""))
            .collect();

        tokens
            .iter()
            .copied()
            .chain(joined.iter().map(String::as_str))
            .filter_map(|candidate| self.match_brand(candidate, &registrable))
            .fold(None, |best: Option<BrandMatch>, m| match best {
                Some(b) if b.confidence() >= m.confidence() => Some(b),
                _ => Some(m),
            })
    }

    /// Closest brand to `token` above the similarity threshold, skipping
    /// brands that own the registrable domain.
    fn match_brand(&self, token: &str, registrable: &str) -> Option<BrandMatch> {
        if token.len() < MIN_TOKEN_LENGTH {
            return None;
        }
        let normalized = undo_substitutions(token);

        BRANDS
            .iter()
            .filter(|brand| !brand.owns_domain(registrable))
            .filter_map(|brand| {
                let mut similarity = normalized_levenshtein(&normalized, brand.name);
                if similarity < self.config.brand_similarity_threshold
                    && wraps_brand_with_lure(&normalized, brand.name)
                {
                    similarity = CONTAINMENT_SIMILARITY;
                }
                if similarity < self.config.brand_similarity_threshold {
                    return None;
                }
                Some(BrandMatch {
                    brand,
                    similarity,
                    distance: levenshtein(token, brand.name),
                })
            })
            .fold(None, |best: Option<BrandMatch>, m| match best {
                Some(b) if b.confidence() >= m.confidence() => Some(b),
                _ => Some(m),
            })
    }
}

/// Analyze with the default thresholds
pub fn analyze_domain(url: &str) -> DomainFinding {
    DomainAnalyzer::default().analyze_domain(url)
}

fn finish(reasons: Vec<String>, brand_impersonation: Option<BrandImpersonation>) -> DomainFinding {
    DomainFinding {
        is_suspicious: !reasons.is_empty() || brand_impersonation.is_some(),
        reasons,
        brand_impersonation,
    }
}

fn parse_target(url_str: &str) -> Result<Url, String> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err("URL could not be parsed: input is empty".to_string());
    }
    match Url::parse(trimmed) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase)
            if DOMAIN_PATTERN.is_match(trimmed) || BARE_IPV4_PATTERN.is_match(trimmed) =>
        {
            Url::parse(&format!("https://{}", trimmed))
                .map_err(|e| format!("URL could not be parsed: {}", e))
        },
        Err(e) => Err(format!("URL could not be parsed: {}", e)),
    }
}

/// True when `token` is `brand` with only lure words glued before or after
/// it. Containment inside an ordinary word (`pineapple`, `steamboat`) does
/// not count.
fn wraps_brand_with_lure(token: &str, brand: &str) -> bool {
    if brand.len() < MIN_WRAPPED_BRAND_LENGTH || token == brand {
        return false;
    }
    let rest = token
        .strip_prefix(brand)
        .or_else(|| token.strip_suffix(brand));
    rest.map(is_lure_run).unwrap_or(false)
}

/// `rest` is one or more lure words or phishing keywords back to back
fn is_lure_run(rest: &str) -> bool {
    !rest.is_empty()
        && PHISHING_KEYWORDS
            .iter()
            .chain(LURE_WORDS.iter())
            .filter_map(|word| rest.strip_prefix(word))
            .any(|tail| tail.is_empty() || is_lure_run(tail))
}

/// Map common look-alike digits and symbols back to letters
fn undo_substitutions(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'l',
            '3' => 'e',
            '4' => 'a',
            '5' => 's',
            '7' => 't',
            '8' => 'b',
            '9' => 'g',
            '@' => 'a',
            '$' => 's',
            other => other,
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
