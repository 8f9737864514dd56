//! ABrowser — engine-independent browser core.
//!
//! Remote extension descriptors, address-bar resolution, and a navigation
//! controller driving an abstract page host.

pub mod config;
pub mod error;
pub mod extensions;
pub mod navigation;
pub mod page;
pub mod shell;
