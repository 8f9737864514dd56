//! Page host trait — the rendering surface the core drives.

use async_trait::async_trait;
use url::Url;

use crate::error::PageError;

/// A web view capable of navigating and executing script.
///
/// The core never inspects rendering state. It issues commands and reads the
/// current location for display.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Load `url` as a new history entry.
    async fn navigate(&self, url: &Url) -> Result<(), PageError>;

    /// Step back in history. No-op at the start of history.
    async fn back(&self) -> Result<(), PageError>;

    /// Step forward in history. No-op at the end of history.
    async fn forward(&self) -> Result<(), PageError>;

    async fn reload(&self) -> Result<(), PageError>;

    /// Execute `code` in the current document.
    async fn evaluate_script(&self, code: &str) -> Result<(), PageError>;

    /// URL of the current document, if one is loaded.
    async fn current_url(&self) -> Option<Url>;

    async fn can_go_back(&self) -> bool;

    async fn can_go_forward(&self) -> bool;
}
