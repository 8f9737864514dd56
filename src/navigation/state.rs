//! Navigation state published to presentation layers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// Snapshot of what the chrome should display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationState {
    /// Address shown in the address bar.
    pub current_url: Option<Url>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Error from the most recent navigation command, cleared on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_url: None,
            can_go_back: false,
            can_go_forward: false,
            last_error: None,
            updated_at: Utc::now(),
        }
    }
}

impl NavigationState {
    /// Address bar text: the current URL, or empty before the first load.
    pub fn address_text(&self) -> String {
        self.current_url
            .as_ref()
            .map(Url::to_string)
            .unwrap_or_default()
    }
}
