//! Explicit server configuration.
//!
//! The tool registry never reads the process environment itself; the binary
//! resolves a [`Config`] once and hands it down, so registration failure is a
//! pure function of the value passed in.

use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the generic API key.
pub const API_KEY_VAR: &str = "API_KEY";

/// Environment variable holding the Shutterstock access token.
pub const SHUTTERSTOCK_TOKEN_VAR: &str = "SHUTTERSTOCK_API_TOKEN";

/// Environment variable overriding the Shutterstock API base URL.
pub const SHUTTERSTOCK_URL_VAR: &str = "SHUTTERSTOCK_API_URL";

/// Public Shutterstock API endpoint.
pub const DEFAULT_SHUTTERSTOCK_URL: &str = "https://api.shutterstock.com";

/// Default timeout for a single search request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shutterstock connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ShutterstockConfig {
    /// Bearer token for the API.
    pub api_token: Option<String>,
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ShutterstockConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_SHUTTERSTOCK_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ShutterstockConfig {
    /// Settings pointing at `base_url` with the given token.
    #[must_use]
    pub fn new(api_token: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The token, or [`Error::MissingSecret`] when absent or empty.
    pub fn require_token(&self) -> Result<&str> {
        require(self.api_token.as_deref(), SHUTTERSTOCK_TOKEN_VAR)
    }
}

/// Everything the tool registry needs at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Value returned by the `get_api_key` tool.
    pub api_key: Option<String>,
    /// Search provider settings.
    pub shutterstock: ShutterstockConfig,
}

impl Config {
    /// Build a config from explicit values.
    #[must_use]
    pub const fn new(api_key: Option<String>, shutterstock: ShutterstockConfig) -> Self {
        Self {
            api_key,
            shutterstock,
        }
    }

    /// The API key, or [`Error::MissingSecret`] when absent or empty.
    pub fn require_api_key(&self) -> Result<&str> {
        require(self.api_key.as_deref(), API_KEY_VAR)
    }

    /// Check that every required secret is present.
    ///
    /// `API_KEY` is checked before `SHUTTERSTOCK_API_TOKEN`.
    pub fn validate(&self) -> Result<()> {
        self.require_api_key()?;
        self.shutterstock.require_token()?;
        Ok(())
    }
}

/// Treat absent and empty values alike.
fn require<'a>(value: Option<&'a str>, var: &'static str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingSecret(var))
}
