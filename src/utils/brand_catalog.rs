// Reference list of frequently impersonated brands
// Shared by the URL heuristics and the page-content heuristics

/// A brand and the registrable domains it legitimately serves from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brand {
    /// Lowercase token used for matching
    pub name: &'static str,
    pub display_name: &'static str,
    pub canonical_domains: &'static [&'static str],
}

impl Brand {
    /// True when `registrable` (already lowercased, no `www.`) belongs to the
    /// brand: a catalogued domain, or the brand name under a country suffix
    /// such as `amazon.fr` or `google.co.uk`.
    pub fn owns_domain(&self, registrable: &str) -> bool {
        if self.canonical_domains.iter().any(|d| *d == registrable) {
            return true;
        }
        match registrable.split_once('.') {
            Some((label, suffix)) => label == self.name && is_country_suffix(suffix),
            None => false,
        }
    }
}

pub const BRANDS: &[Brand] = &[
    Brand { name: "paypal", display_name: "PayPal", canonical_domains: &["paypal.com", "paypal.me", "paypalobjects.com"] },
    Brand { name: "google", display_name: "Google", canonical_domains: &["google.com", "gmail.com", "youtube.com", "googleapis.com", "googleusercontent.com", "googletagmanager.com", "google-analytics.com", "blog.google"] },
    Brand { name: "microsoft", display_name: "Microsoft", canonical_domains: &["microsoft.com", "live.com", "office.com", "outlook.com", "microsoftonline.com"] },
    Brand { name: "outlook", display_name: "Outlook", canonical_domains: &["outlook.com", "live.com", "microsoft.com"] },
    Brand { name: "office365", display_name: "Office 365", canonical_domains: &["office.com", "microsoft.com"] },
    Brand { name: "apple", display_name: "Apple", canonical_domains: &["apple.com", "icloud.com"] },
    Brand { name: "icloud", display_name: "iCloud", canonical_domains: &["icloud.com", "apple.com", "icloud-content.com"] },
    Brand { name: "amazon", display_name: "Amazon", canonical_domains: &["amazon.com", "amazon.co.uk", "amazon.de", "amazonaws.com", "amazon-adsystem.com"] },
    Brand { name: "facebook", display_name: "Facebook", canonical_domains: &["facebook.com", "facebook.net", "fb.com", "meta.com"] },
    Brand { name: "instagram", display_name: "Instagram", canonical_domains: &["instagram.com"] },
    Brand { name: "netflix", display_name: "Netflix", canonical_domains: &["netflix.com"] },
    Brand { name: "linkedin", display_name: "LinkedIn", canonical_domains: &["linkedin.com"] },
    Brand { name: "twitter", display_name: "Twitter", canonical_domains: &["twitter.com", "x.com"] },
    Brand { name: "github", display_name: "GitHub", canonical_domains: &["github.com", "github.io", "githubusercontent.com", "githubassets.com", "github.blog"] },
    Brand { name: "dropbox", display_name: "Dropbox", canonical_domains: &["dropbox.com"] },
    Brand { name: "docusign", display_name: "DocuSign", canonical_domains: &["docusign.com", "docusign.net"] },
    Brand { name: "coinbase", display_name: "Coinbase", canonical_domains: &["coinbase.com"] },
    Brand { name: "binance", display_name: "Binance", canonical_domains: &["binance.com"] },
    Brand { name: "chase", display_name: "Chase", canonical_domains: &["chase.com", "jpmorganchase.com"] },
    Brand { name: "wellsfargo", display_name: "Wells Fargo", canonical_domains: &["wellsfargo.com"] },
    Brand { name: "bankofamerica", display_name: "Bank of America", canonical_domains: &["bankofamerica.com"] },
    Brand { name: "ebay", display_name: "eBay", canonical_domains: &["ebay.com"] },
    Brand { name: "steam", display_name: "Steam", canonical_domains: &["steampowered.com", "steamcommunity.com"] },
    Brand { name: "whatsapp", display_name: "WhatsApp", canonical_domains: &["whatsapp.com"] },
    Brand { name: "dhl", display_name: "DHL", canonical_domains: &["dhl.com"] },
    Brand { name: "fedex", display_name: "FedEx", canonical_domains: &["fedex.com"] },
];

/// Look up a brand by its matching token
pub fn find_brand(name: &str) -> Option<&'static Brand> {
    BRANDS.iter().find(|b| b.name == name)
}

/// Second-level suffixes under which the registrable domain has three labels
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "co.jp", "co.nz", "co.za",
    "co.in", "com.br", "com.mx", "com.cn", "com.tr", "com.ru", "co.cc",
];

/// Registrable domain (eTLD+1 approximation) of a lowercase host without `www.`
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.');
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }
    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_LABEL_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    labels[labels.len() - keep..].join(".")
}

/// Country-code suffixes brands commonly run regional sites under. Free
/// registries that are mostly abused (`tk`, `ml`, `ga`, `cf`, `gq`) are absent.
const COUNTRY_SUFFIXES: &[&str] = &[
    "ca", "mx", "br", "ar", "cl", "uk", "ie", "fr", "de", "at", "ch", "it", "es", "pt", "nl",
    "be", "lu", "dk", "se", "no", "fi", "pl", "cz", "gr", "tr", "ru", "in", "jp", "kr", "cn",
    "hk", "tw", "sg", "my", "id", "ph", "th", "vn", "au", "nz", "za", "eg", "ae", "sa", "il",
];

fn is_country_suffix(suffix: &str) -> bool {
    COUNTRY_SUFFIXES.contains(&suffix)
        || (suffix != "co.cc" && MULTI_LABEL_SUFFIXES.contains(&suffix))
}

/// Length of the public suffix portion, in labels
pub fn suffix_label_count(host: &str) -> usize {
    registrable_domain(host).split('.').count() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("login.paypal.com"), "paypal.com");
        assert_eq!(registrable_domain("paypal.com"), "paypal.com");
        assert_eq!(registrable_domain("shop.amazon.co.uk"), "amazon.co.uk");
        assert_eq!(registrable_domain("localhost"), "localhost");
        assert_eq!(suffix_label_count("a.b.example.co.uk"), 2);
    }

    #[test]
    fn test_brand_ownership() {
        let paypal = find_brand("paypal").unwrap();
        assert!(paypal.owns_domain("paypal.com"));
        assert!(!paypal.owns_domain("paypa1.com"));
    }

    #[test]
    fn test_regional_domains_are_owned() {
        assert!(find_brand("amazon").unwrap().owns_domain("amazon.fr"));
        assert!(find_brand("google").unwrap().owns_domain("google.co.uk"));
        assert!(find_brand("github").unwrap().owns_domain("github.blog"));

        let paypal = find_brand("paypal").unwrap();
        assert!(!paypal.owns_domain("paypal.tk"));
        assert!(!paypal.owns_domain("paypal.co.cc"));
        assert!(!paypal.owns_domain("paypal-help.fr"));
        assert!(!paypal.owns_domain("paypal.xyz"));
    }
}
