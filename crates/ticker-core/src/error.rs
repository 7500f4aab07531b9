// File: crates/ticker-core/src/error.rs
// Summary: Error taxonomy for configuration, image fetching and rendering failures.

use thiserror::Error;

/// Result type alias for compositor operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid size, geometry, series shape or configuration value.
    /// Raised before anything is drawn.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Network or decode failure while resolving an image. Never cached.
    #[error("failed to load image '{url}': {reason}")]
    ImageFetch { url: String, reason: String },

    /// Canvas or encoder failure.
    #[error("render failed: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn render(msg: impl Into<String>) -> Self {
        Error::Render(msg.into())
    }

    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        Error::ImageFetch { url: url.to_string(), reason: reason.to_string() }
    }
}
