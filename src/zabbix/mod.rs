//! Zabbix JSON-RPC backend access
//!
//! Provides the request envelope and transport, typed response records, and the
//! handful of calls the tools are built from.

pub mod api;
pub mod client;
pub mod records;

pub use client::{MonitoringBackend, ZabbixClient};
