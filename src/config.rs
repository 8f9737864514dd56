//! Configuration types.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default search endpoint; the URL-escaped query is appended.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://ecosia.org/search?q=";

/// User agent sent with extension fetches.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15";

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Address loaded on startup (address-bar input, not necessarily a URL).
    pub home: String,
    /// Search endpoint used for non-URL address-bar input.
    pub search_endpoint: String,
    /// User agent for extension fetches.
    pub user_agent: String,
    /// Timeout for a single extension fetch.
    pub fetch_timeout: Duration,
    /// Extensions installed on startup.
    pub extensions: Vec<Url>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            home: "ecosia.org".to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(30),
            extensions: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Build configuration from `ABROWSER_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let home = lookup("ABROWSER_HOME").unwrap_or(defaults.home);
        let search_endpoint = lookup("ABROWSER_SEARCH_URL").unwrap_or(defaults.search_endpoint);
        let user_agent = lookup("ABROWSER_USER_AGENT").unwrap_or(defaults.user_agent);

        let fetch_timeout = match lookup("ABROWSER_FETCH_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ABROWSER_FETCH_TIMEOUT_SECS".into(),
                    message: format!("expected whole seconds, got {raw:?}"),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.fetch_timeout,
        };

        let extensions = lookup("ABROWSER_EXTENSIONS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Url::parse(s).map_err(|e| ConfigError::InvalidValue {
                    key: "ABROWSER_EXTENSIONS".into(),
                    message: format!("{s}: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            home,
            search_endpoint,
            user_agent,
            fetch_timeout,
            extensions,
        })
    }
}
