//! Error types for ABrowser.

/// Top-level error type for the browser core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extension parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Extension fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Page error: {0}")]
    Page(#[from] PageError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Extension descriptor parse errors.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required header field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed body: expected 3 sections separated by '------', found {sections}")]
    MalformedBody { sections: usize },

    #[error("Invalid applies-to pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Extension fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("Server responded with HTTP {status}")]
    Http { status: u16 },

    #[error("Unexpected content: {reason}")]
    UnexpectedContentType { reason: String },
}

/// Address bar resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,

    #[error("Cannot build a URL from {input:?}: {reason}")]
    InvalidUrl { input: String, reason: String },
}

/// Errors reported by a page host.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("No document is loaded")]
    NoDocument,

    #[error("Page host failure: {0}")]
    Host(String),
}

/// Navigation controller errors.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("Navigation controller has stopped")]
    Stopped,
}

/// Result type alias for the browser core.
pub type Result<T> = std::result::Result<T, Error>;
