//! Extension loader — fetches descriptor text and hands extracted code to a page.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};
use url::Url;

use super::descriptor::ExtensionDescriptor;
use crate::config::BrowserConfig;
use crate::error::{ConfigError, Error, FetchError};
use crate::page::PageHost;

/// Media type an extension response must declare.
const EXTENSION_MEDIA_TYPE: &str = "text/plain";

/// Fetches extension descriptors over HTTP.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ExtensionLoader {
    client: reqwest::Client,
}

impl ExtensionLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a loader using the configured user agent and fetch timeout.
    pub fn from_config(config: &BrowserConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "http_client".into(),
                message: e.to_string(),
            })?;
        Ok(Self::new(client))
    }

    /// Issue a single GET for `location` and return the body as text.
    pub async fn fetch(&self, location: &Url) -> Result<String, FetchError> {
        debug!(url = %location, "Fetching extension");

        let response = self
            .client
            .get(location.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: location.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %location, status = status.as_u16(), "Extension fetch rejected");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_plain_text(content_type.as_deref()) {
            let content_type = content_type.as_deref().unwrap_or("no content type");
            warn!(url = %location, content_type, "Extension fetch rejected");
            return Err(FetchError::UnexpectedContentType {
                reason: format!("expected {EXTENSION_MEDIA_TYPE}, got {content_type}"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport {
                url: location.to_string(),
                reason: e.to_string(),
            })?;

        let text = String::from_utf8(body.to_vec()).map_err(|e| {
            warn!(url = %location, error = %e, "Extension fetch rejected");
            FetchError::UnexpectedContentType {
                reason: format!("body is not valid UTF-8: {e}"),
            }
        })?;

        // A leading byte-order mark would hide the first header line.
        match text.strip_prefix('\u{FEFF}') {
            Some(rest) => Ok(rest.to_string()),
            None => Ok(text),
        }
    }

    /// Fetch and parse the descriptor at `location`.
    pub async fn load(&self, location: &Url) -> Result<ExtensionDescriptor, Error> {
        let text = self.fetch(location).await?;
        let descriptor = ExtensionDescriptor::parse(&text)?;

        info!(
            url = %location,
            name = descriptor.name(),
            author = descriptor.author(),
            applies_to = descriptor.applies_to().as_str(),
            "Extension loaded"
        );

        Ok(descriptor)
    }
}

/// Submit extension code to `page` for execution.
///
/// Fire-and-forget: the code is not inspected, no script result is returned,
/// and failures inside the page are only logged.
pub async fn apply(code: &str, page: &dyn PageHost) {
    match page.evaluate_script(code).await {
        Ok(()) => debug!(bytes = code.len(), "Extension script submitted"),
        Err(e) => warn!(error = %e, "Extension script failed"),
    }
}

/// Whether a `Content-Type` value names `text/plain`, ignoring parameters.
fn is_plain_text(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(EXTENSION_MEDIA_TYPE))
}
