//! MCP tool registry for toolbox.
//!
//! Five fixed tools are bound through `rmcp`'s tool router. Arguments are
//! deserialized into typed parameter structs before a handler runs, so
//! malformed calls are rejected as `invalid_params` without touching
//! handler code.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rmcp::{
    ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, InitializeResult, ProtocolVersion,
        ServerCapabilities,
    },
    schemars::JsonSchema,
    tool, tool_handler, tool_router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use toolbox::{Config, SearchQuery, ShutterstockClient};

/// Type alias for ServerInfo (same as InitializeResult).
type ServerInfo = InitializeResult;

/// Source of registry ids, unique per process.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Releases a registry once every clone of it is gone.
#[derive(Debug)]
pub(crate) struct Lease {
    /// Registry id.
    id: u64,
}

impl Drop for Lease {
    fn drop(&mut self) {
        tracing::debug!(registry = self.id, "tool registry released");
    }
}

/// MCP server exposing the toolbox tools.
#[derive(Clone, Debug)]
pub struct ToolboxServer {
    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
    /// Secret returned by `get_api_key`.
    api_key: Arc<str>,
    /// Search provider client.
    search: ShutterstockClient,
    /// Shared by clones; dropped with the last one.
    pub(crate) lease: Arc<Lease>,
}

impl ToolboxServer {
    /// Register the tools against `config`.
    ///
    /// Fails with [`toolbox::Error::MissingSecret`] when `API_KEY` or
    /// `SHUTTERSTOCK_API_TOKEN` is absent, and with
    /// [`toolbox::Error::InvalidSecret`] when the token cannot be sent.
    pub fn new(config: &Config) -> toolbox::Result<Self> {
        config.validate()?;
        let api_key = Arc::from(config.require_api_key()?);
        let search = ShutterstockClient::new(&config.shutterstock)?;

        Ok(Self {
            tool_router: Self::tool_router(),
            api_key,
            search,
            lease: Arc::new(Lease {
                id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            }),
        })
    }

    /// Process-unique id of this registry instance.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.lease.id
    }
}

/// Parameters for echo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EchoParams {
    /// Text to send back.
    pub text: String,
}

/// Parameters for greet tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GreetParams {
    /// Who to greet (default: "World").
    #[serde(default = "default_name")]
    pub name: String,
    /// Greeting word (default: "Hello").
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

/// Parameters for calculate_area tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AreaParams {
    /// Rectangle length.
    pub length: f64,
    /// Rectangle width.
    pub width: f64,
}

/// Parameters for search_shutterstock tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Search term, e.g. 'mountain lake'.
    pub term: String,
    /// Image type: photo, illustration or vector (default: photo).
    pub image_type: Option<String>,
    /// Orientation: horizontal or vertical (default: vertical).
    pub orientation: Option<String>,
}

fn default_name() -> String {
    "World".to_string()
}
fn default_greeting() -> String {
    "Hello".to_string()
}

/// Single text block result.
fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

#[tool_router]
impl ToolboxServer {
    /// Echo the given text back unchanged.
    #[tool(name = "echo")]
    async fn echo(
        &self,
        params: Parameters<EchoParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(text_result(params.0.text))
    }

    /// Greet someone. Both the name and the greeting word are optional.
    #[tool(name = "greet")]
    async fn greet(
        &self,
        params: Parameters<GreetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let p = params.0;
        Ok(text_result(format!("{}, {}!", p.greeting, p.name)))
    }

    /// Calculate the area of a rectangle from its length and width.
    #[tool(name = "calculate_area")]
    async fn calculate_area(
        &self,
        params: Parameters<AreaParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let p = params.0;
        let area = p.length * p.width;
        Ok(text_result(format!("The area of the rectangle is {area}")))
    }

    /// Return the configured API key.
    #[tool(name = "get_api_key")]
    async fn get_api_key(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(text_result(&*self.api_key))
    }

    /// Search Shutterstock for images. Returns up to five of the most popular
    /// matches as JSON metadata records.
    #[tool(name = "search_shutterstock")]
    async fn search_shutterstock(
        &self,
        params: Parameters<SearchParams>,
        ct: CancellationToken,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let p = params.0;
        if p.term.trim().is_empty() {
            return Err(rmcp::ErrorData::invalid_params("term must not be empty", None));
        }

        let query = SearchQuery::new(&p.term)
            .image_type(p.image_type)
            .orientation(p.orientation);

        let searched = tokio::select! {
            result = self.search.search_images(&query) => result,
            () = ct.cancelled() => {
                tracing::debug!(term = %p.term, "search cancelled");
                return Err(rmcp::ErrorData::internal_error("request cancelled", None));
            }
        };

        // Provider failures are reported as tool output, never as protocol errors
        let text = match searched.and_then(|outcome| outcome.to_text()) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(term = %p.term, error = %e, "shutterstock search failed");
                format!("Error searching for \"{}\": {e}", p.term)
            }
        };

        Ok(text_result(text))
    }
}

#[tool_handler]
impl ServerHandler for ToolboxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "toolbox".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Toolbox demo server. Use 'echo', 'greet' and 'calculate_area' for simple \
                 utilities, 'get_api_key' to read the configured key, and \
                 'search_shutterstock' to find stock images."
                    .into(),
            ),
        }
    }
}
