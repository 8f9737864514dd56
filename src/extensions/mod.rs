//! Remote extensions: descriptor parsing, fetching, and script injection.
//!
//! There is no sandboxing or permission model. Fetched code runs in the page
//! exactly as written.

pub mod descriptor;
pub mod loader;
pub mod source;

pub use descriptor::{DEFAULT_EXTENSION_NAME, ExtensionDescriptor, SECTION_DELIMITER};
pub use loader::{ExtensionLoader, apply};
pub use source::ExtensionSource;
