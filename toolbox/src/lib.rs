//! Toolbox - shared building blocks for the toolbox MCP server.
//!
//! Holds everything the protocol layer needs that is not protocol-specific:
//! explicit configuration for the required secrets, a single error type, and
//! the Shutterstock image search adapter.
//!
//! ## Features
//!
//! - Secrets injected as a [`Config`] value rather than read ad hoc
//! - Fixed-shape image search against the Shutterstock v2 API
//! - Provider failures surfaced as typed [`Error`] values

pub mod config;
pub mod error;
pub mod shutterstock;

pub use config::{
    API_KEY_VAR, Config, DEFAULT_SHUTTERSTOCK_URL, SHUTTERSTOCK_TOKEN_VAR, SHUTTERSTOCK_URL_VAR,
    ShutterstockConfig,
};
pub use error::{Error, Result};
pub use shutterstock::{SearchOutcome, SearchQuery, ShutterstockClient};
