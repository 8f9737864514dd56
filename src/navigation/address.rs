//! Address bar resolution.
//!
//! Input is classified three ways, first match wins:
//! 1. has a scheme (`scheme://`) → used as-is
//! 2. looks like a host ending in a known TLD → `https://` prefixed
//! 3. anything else → search query

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::DEFAULT_SEARCH_ENDPOINT;
use crate::error::AddressError;

/// Top-level domains recognized as "this is a site, not a search".
pub const KNOWN_TLDS: &[&str] = &[
    "com", "net", "org", "be", "codes", "io", "co", "us", "ru", "de", "br", "uk", "jp", "fr",
    "it", "edu", "me", "cn", "ly", "in", "tv", "ai", "int", "gov", "app", "mil",
];

static SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+://").expect("scheme regex"));

// host.tld, optional port, optional path/query/fragment; no whitespace anywhere.
static KNOWN_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^[^\s/?#]+\.(?:{})(?::\d+)?(?:[/?#]\S*)?$",
        KNOWN_TLDS.join("|")
    ))
    .expect("domain regex")
});

/// How an address-bar input was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Input carried its own scheme.
    Absolute,
    /// Bare domain, upgraded to https.
    Domain,
    /// Free text sent to the search endpoint.
    Search,
}

/// Turns address-bar input into a URL to load.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    search_endpoint: String,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_ENDPOINT)
    }
}

impl AddressResolver {
    /// `search_endpoint` gets the escaped query appended verbatim.
    pub fn new(search_endpoint: impl Into<String>) -> Self {
        Self {
            search_endpoint: search_endpoint.into(),
        }
    }

    pub fn classify(&self, input: &str) -> AddressKind {
        let input = input.trim();
        if SCHEME.is_match(input) {
            AddressKind::Absolute
        } else if KNOWN_DOMAIN.is_match(input) {
            AddressKind::Domain
        } else {
            AddressKind::Search
        }
    }

    pub fn resolve(&self, input: &str) -> Result<Url, AddressError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AddressError::Empty);
        }

        let candidate = match self.classify(input) {
            AddressKind::Absolute => input.to_string(),
            AddressKind::Domain => format!("https://{input}"),
            AddressKind::Search => {
                format!("{}{}", self.search_endpoint, urlencoding::encode(input))
            }
        };

        Url::parse(&candidate).map_err(|e| AddressError::InvalidUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(input: &str) -> Url {
        AddressResolver::default().resolve(input).unwrap()
    }

    #[test]
    fn bare_domain_gets_https() {
        let url = resolve("openai.com");
        assert_eq!(url.as_str(), "https://openai.com/");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("openai.com"));
    }

    #[test]
    fn domain_with_path_and_port() {
        assert_eq!(
            resolve("crates.io/crates/regex").as_str(),
            "https://crates.io/crates/regex"
        );
        assert_eq!(resolve("example.org:8443/").port(), Some(8443));
        assert_eq!(resolve("www.bbc.co.uk").host_str(), Some("www.bbc.co.uk"));
    }

    #[test]
    fn free_text_goes_to_search() {
        let url = resolve("hello world");
        assert_eq!(url.as_str(), "https://ecosia.org/search?q=hello%20world");
    }

    #[test]
    fn search_query_is_escaped() {
        let url = resolve("rust & c++?");
        assert!(url.as_str().ends_with("?q=rust%20%26%20c%2B%2B%3F"));
    }

    #[test]
    fn scheme_input_is_unchanged() {
        assert_eq!(resolve("ftp://host/").as_str(), "ftp://host/");
        assert_eq!(
            resolve("http://example.com/a?b=c").as_str(),
            "http://example.com/a?b=c"
        );
    }

    #[test]
    fn unknown_tld_falls_through_to_search() {
        let resolver = AddressResolver::default();
        assert_eq!(resolver.classify("example.xyz"), AddressKind::Search);
        assert_eq!(resolver.classify("localhost:8080"), AddressKind::Search);
        // ".com" must end the host, not just appear in it.
        assert_eq!(resolver.classify("foo.company"), AddressKind::Search);
    }

    #[test]
    fn classification() {
        let resolver = AddressResolver::default();
        assert_eq!(resolver.classify("https://a.b"), AddressKind::Absolute);
        assert_eq!(resolver.classify("  Example.COM  "), AddressKind::Domain);
        assert_eq!(resolver.classify("what is example.com"), AddressKind::Search);
    }

    #[test]
    fn custom_search_endpoint() {
        let resolver = AddressResolver::new("https://duckduckgo.com/?q=");
        assert_eq!(
            resolver.resolve("ferris crab").unwrap().as_str(),
            "https://duckduckgo.com/?q=ferris%20crab"
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            AddressResolver::default().resolve("   "),
            Err(AddressError::Empty)
        ));
    }

    #[test]
    fn broken_absolute_url_is_rejected() {
        assert!(matches!(
            AddressResolver::default().resolve("http://"),
            Err(AddressError::InvalidUrl { .. })
        ));
    }
}
