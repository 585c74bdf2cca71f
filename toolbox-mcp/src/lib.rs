//! Toolbox MCP Server - Model Context Protocol server for the toolbox tools.
//!
//! This crate exposes a small fixed tool set to AI assistants via the Model
//! Context Protocol.
//!
//! ## Features
//!
//! - **Tools**: echo, greet, calculate_area, get_api_key, search_shutterstock
//! - **Transports**: stdio (local) and stateless HTTP (remote)
//!
//! ## Usage
//!
//! ```bash
//! # Start with stdio transport (default)
//! toolbox-mcp
//!
//! # Start with HTTP transport
//! toolbox-mcp --transport http --port 3000
//! ```

pub mod http;
pub mod server;

pub use server::ToolboxServer;
