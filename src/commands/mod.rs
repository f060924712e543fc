//! Command implementations for the CLI
//!
//! - serve: Run the stats API in front of the node's JSON-RPC
//! - watch: Live terminal dashboard fed by the stats API
//! - test: Test configuration validity
//! - config: Configuration display and validation

pub mod config;
pub mod serve;
pub mod watch;
