//! Stateless HTTP transport.
//!
//! Every `POST /mcp` gets its own [`ToolboxServer`], served by rmcp on a
//! one-shot transport for exactly one JSON-RPC request. The running session
//! is owned by the request future: it is cancelled as soon as the reply has
//! been taken, and dropping the future (client gone, handler error) cancels
//! it too, so the registry is released on every exit path.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use rmcp::{
    RoleServer,
    model::{ClientJsonRpcMessage, ErrorCode, ServerJsonRpcMessage},
    service::serve_directly,
    transport::OneshotTransport,
};
use serde_json::json;
use tokio::net::TcpListener;
use toolbox::Config;

use crate::server::ToolboxServer;

/// Path of the MCP endpoint.
pub const MCP_PATH: &str = "/mcp";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// JSON-RPC code for a rejected HTTP method.
pub const METHOD_NOT_ALLOWED_CODE: i32 = -32000;

/// Builds one registry per request.
type RegistryFactory = Arc<dyn Fn() -> io::Result<ToolboxServer> + Send + Sync>;

/// Router building a fresh registry from `config` for every request.
pub fn router(config: Arc<Config>) -> Router {
    router_with_factory(move || ToolboxServer::new(&config).map_err(io::Error::other))
}

/// Router using a custom registry factory.
///
/// The factory runs once per `POST` carrying a request; an error becomes the
/// generic internal-error response.
pub fn router_with_factory<F>(factory: F) -> Router
where
    F: Fn() -> io::Result<ToolboxServer> + Send + Sync + 'static,
{
    let factory: RegistryFactory = Arc::new(factory);

    Router::new()
        .route(MCP_PATH, post(handle_post).fallback(method_not_allowed))
        .with_state(factory)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, config: Arc<Config>) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "toolbox MCP server listening on http://{}{MCP_PATH}",
        listener.local_addr()?
    );

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Failure while registering tools or forwarding a request.
#[derive(Debug)]
struct InternalError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for InternalError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        tracing::error!("error handling MCP request: {:#}", self.0);
        jsonrpc_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::INTERNAL_ERROR.0,
            "Internal server error",
        )
    }
}

/// Serve one JSON-RPC request on a registry of its own.
async fn handle_post(
    State(factory): State<RegistryFactory>,
    body: Bytes,
) -> Result<Response, InternalError> {
    let message: ClientJsonRpcMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!("rejecting malformed request: {e}");
            return Ok(jsonrpc_error(
                StatusCode::BAD_REQUEST,
                ErrorCode::PARSE_ERROR.0,
                "Parse error",
            ));
        }
    };

    // Notifications and responses have nothing to answer
    if !matches!(message, ClientJsonRpcMessage::Request(_)) {
        return Ok(StatusCode::ACCEPTED.into_response());
    }

    let server = factory()?;
    let registry = server.id();
    tracing::debug!(registry, "tool registry built");

    let (transport, mut outbound) = OneshotTransport::<RoleServer>::new(message);
    let session = serve_directly(server, transport, None);

    let reply = loop {
        match outbound.recv().await {
            Some(reply @ (ServerJsonRpcMessage::Response(_) | ServerJsonRpcMessage::Error(_))) => {
                break Some(reply);
            }
            Some(_) => {}
            None => break None,
        }
    };

    if let Err(e) = session.cancel().await {
        tracing::warn!(registry, "session task failed: {e}");
    }

    let reply = reply.ok_or_else(|| anyhow::anyhow!("session closed without a reply"))?;
    Ok(Json(reply).into_response())
}

/// JSON-RPC error envelope with a null id.
fn jsonrpc_error(status: StatusCode, code: i32, message: &str) -> Response {
    let body = json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": message },
        "id": null,
    });
    (status, Json(body)).into_response()
}

/// Anything but POST on the endpoint.
async fn method_not_allowed() -> Response {
    jsonrpc_error(
        StatusCode::METHOD_NOT_ALLOWED,
        METHOD_NOT_ALLOWED_CODE,
        "Method not allowed.",
    )
}
