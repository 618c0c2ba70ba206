//! Domain expiry reconciliation, host provisioning and metric reporting
//!
//! Provides the business logic exposed over the MCP protocol.

pub mod inventory;
pub mod metrics;
pub mod provision;
pub mod reconcile;
pub mod resources;
pub mod tools;
pub mod utils;
