//! Extension source — a location plus its most recently loaded descriptor.

use url::Url;

use super::descriptor::ExtensionDescriptor;
use super::loader::{ExtensionLoader, apply};
use crate::error::Error;
use crate::page::PageHost;

/// An extension addressed by URL.
///
/// Construction does no I/O; the descriptor is only available after
/// [`ExtensionSource::load`] succeeds.
#[derive(Debug, Clone)]
pub struct ExtensionSource {
    location: Url,
    descriptor: Option<ExtensionDescriptor>,
}

impl ExtensionSource {
    pub fn new(location: Url) -> Self {
        Self {
            location,
            descriptor: None,
        }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Descriptor from the last successful load, if any.
    pub fn descriptor(&self) -> Option<&ExtensionDescriptor> {
        self.descriptor.as_ref()
    }

    /// Fetch and parse the descriptor. A failed load keeps the previous one.
    pub async fn load(&mut self, loader: &ExtensionLoader) -> Result<&ExtensionDescriptor, Error> {
        let descriptor = loader.load(&self.location).await?;
        Ok(self.descriptor.insert(descriptor))
    }

    /// Re-fetch the descriptor and inject its code into `page`.
    pub async fn evaluate(
        &mut self,
        loader: &ExtensionLoader,
        page: &dyn PageHost,
    ) -> Result<(), Error> {
        let descriptor = self.load(loader).await?;
        apply(descriptor.code(), page).await;
        Ok(())
    }

    /// Inject the already-loaded code into `page` if the pattern matches `url`.
    ///
    /// Returns whether the code was submitted.
    pub async fn apply_if_matching(&self, url: &Url, page: &dyn PageHost) -> bool {
        match &self.descriptor {
            Some(descriptor) if descriptor.applies_to_url(url) => {
                apply(descriptor.code(), page).await;
                true
            }
            _ => false,
        }
    }
}
