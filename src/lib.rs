pub mod chain;
pub mod config;
pub mod error;
pub mod format;
pub mod handlers;
pub mod metrics;
pub mod rpc;
pub mod server;
pub mod signals;
pub mod stats;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over `default_level`. With `json = true` events are written
/// as one JSON object per line.
///
/// Note: This function can only be called once.
pub fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
