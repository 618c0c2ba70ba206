//! HTTP transport layer for the Model Context Protocol
//!
//! Provides the `/mcp` listener and the public metadata endpoints.

pub mod handlers;
