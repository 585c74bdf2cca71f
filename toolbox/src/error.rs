//! Error types for toolbox.

use thiserror::Error;

/// Errors raised by configuration and the search adapter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required secret is absent or empty.
    #[error("required environment variable {0} is not set")]
    MissingSecret(&'static str),

    /// A secret is set but cannot be sent as a header value.
    #[error("environment variable {0} contains characters not allowed in an HTTP header")]
    InvalidSecret(&'static str),

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Provider-supplied message, or the raw body.
        message: String,
    },

    /// The provider body could not be decoded.
    #[error("invalid provider response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a fatal configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::MissingSecret(_) | Self::InvalidSecret(_))
    }
}

/// Result alias for toolbox operations.
pub type Result<T> = std::result::Result<T, Error>;
