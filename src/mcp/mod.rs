//! MCP (Model Context Protocol) Server for kwsearch
//!
//! Exposes the `file://{path}` resource and the `search_file` tool via
//! JSON-RPC over stdio.

mod protocol;
mod server;

pub use server::McpServer;
