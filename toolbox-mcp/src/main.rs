//! Toolbox MCP Server - Entry point for the stdio and HTTP transports.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rmcp::ServiceExt;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use toolbox::{
    API_KEY_VAR, Config, DEFAULT_SHUTTERSTOCK_URL, SHUTTERSTOCK_TOKEN_VAR, SHUTTERSTOCK_URL_VAR,
    ShutterstockConfig,
};
use toolbox_mcp::{ToolboxServer, http};

/// Exit status for a configuration error (`EX_CONFIG`).
const EXIT_CONFIG: u8 = 78;

/// Transport to serve on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// One long-lived session over stdin/stdout.
    Stdio,
    /// Stateless HTTP, one registry per request.
    Http,
}

/// Toolbox MCP Server - demo tools over the Model Context Protocol.
#[derive(Parser, Debug)]
#[command(name = "toolbox-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transport to serve on.
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Address to bind for the HTTP transport.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// Port for the HTTP transport.
    #[arg(short, long, env = "PORT", default_value_t = http::DEFAULT_PORT)]
    port: u16,

    /// Value returned by the get_api_key tool.
    #[arg(long, env = API_KEY_VAR, hide_env_values = true)]
    api_key: Option<String>,

    /// Shutterstock API access token.
    #[arg(long, env = SHUTTERSTOCK_TOKEN_VAR, hide_env_values = true)]
    shutterstock_token: Option<String>,

    /// Shutterstock API base URL.
    #[arg(long, env = SHUTTERSTOCK_URL_VAR, default_value = DEFAULT_SHUTTERSTOCK_URL)]
    shutterstock_url: String,

    /// Search request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging to stderr (stdout is used for MCP communication)
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::new(
        args.api_key,
        ShutterstockConfig::new(args.shutterstock_token, args.shutterstock_url)
            .with_timeout(Duration::from_secs(args.timeout_secs)),
    );

    // Missing or unusable secrets are fatal for both transports
    let server = match ToolboxServer::new(&config) {
        Ok(server) => server,
        Err(e) if e.is_config() => {
            tracing::error!("{e}");
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
        Err(e) => return Err(e.into()),
    };

    match args.transport {
        Transport::Stdio => serve_stdio(server).await?,
        Transport::Http => {
            drop(server);
            let addr = SocketAddr::new(args.host, args.port);
            http::serve(addr, Arc::new(config)).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Serve a single session over stdin/stdout until the client disconnects.
async fn serve_stdio(server: ToolboxServer) -> Result<()> {
    let service = server.serve(rmcp::transport::stdio()).await?;
    tracing::info!("toolbox MCP server running on stdio");

    // Wait for the service to complete
    service.waiting().await?;

    Ok(())
}
