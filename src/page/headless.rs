//! Headless page — in-memory history and script log, no rendering.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use super::host::PageHost;
use crate::error::PageError;

/// A script that was executed, and the document it ran against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatedScript {
    pub url: Url,
    pub code: String,
}

#[derive(Debug, Default)]
struct HeadlessState {
    history: Vec<Url>,
    index: Option<usize>,
    scripts: Vec<EvaluatedScript>,
    reloads: usize,
}

impl HeadlessState {
    fn current(&self) -> Option<&Url> {
        self.index.and_then(|i| self.history.get(i))
    }

    fn push_history(&mut self, url: Url) {
        if let Some(index) = self.index {
            self.history.truncate(index + 1);
        }

        if self.history.last() != Some(&url) {
            self.history.push(url);
        }
        self.index = Some(self.history.len() - 1);
    }
}

/// Page host that keeps a history list and records evaluated scripts.
#[derive(Debug, Default)]
pub struct HeadlessPage {
    state: RwLock<HeadlessState>,
}

impl HeadlessPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts executed so far, oldest first.
    pub async fn scripts(&self) -> Vec<EvaluatedScript> {
        self.state.read().await.scripts.clone()
    }

    /// Full history list, including forward entries.
    pub async fn history(&self) -> Vec<Url> {
        self.state.read().await.history.clone()
    }

    pub async fn reload_count(&self) -> usize {
        self.state.read().await.reloads
    }
}

#[async_trait]
impl PageHost for HeadlessPage {
    async fn navigate(&self, url: &Url) -> Result<(), PageError> {
        debug!(url = %url, "Headless navigate");
        self.state.write().await.push_history(url.clone());
        Ok(())
    }

    async fn back(&self) -> Result<(), PageError> {
        let mut state = self.state.write().await;
        if let Some(index) = state.index.filter(|&i| i > 0) {
            state.index = Some(index - 1);
        }
        Ok(())
    }

    async fn forward(&self) -> Result<(), PageError> {
        let mut state = self.state.write().await;
        if let Some(index) = state.index.filter(|&i| i + 1 < state.history.len()) {
            state.index = Some(index + 1);
        }
        Ok(())
    }

    async fn reload(&self) -> Result<(), PageError> {
        let mut state = self.state.write().await;
        if state.current().is_none() {
            return Err(PageError::NoDocument);
        }
        state.reloads += 1;
        Ok(())
    }

    async fn evaluate_script(&self, code: &str) -> Result<(), PageError> {
        let mut state = self.state.write().await;
        let url = state.current().cloned().ok_or(PageError::NoDocument)?;
        state.scripts.push(EvaluatedScript {
            url,
            code: code.to_string(),
        });
        Ok(())
    }

    async fn current_url(&self) -> Option<Url> {
        self.state.read().await.current().cloned()
    }

    async fn can_go_back(&self) -> bool {
        matches!(self.state.read().await.index, Some(i) if i > 0)
    }

    async fn can_go_forward(&self) -> bool {
        let state = self.state.read().await;
        matches!(state.index, Some(i) if i + 1 < state.history.len())
    }
}
