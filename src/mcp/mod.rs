//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides JSON-RPC validation, negotiation, formatting, and routing.

pub mod rpc;
pub mod server;
