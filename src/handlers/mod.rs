pub mod chain;
pub mod health;
pub mod metrics_handler;

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::Config;
use crate::rpc::NodeRpc;

/// Shared state for the stats API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<Config>>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Arc<ArcSwap<Config>>) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// RPC client for the currently loaded configuration
    pub fn rpc(&self) -> NodeRpc {
        NodeRpc::new(self.http_client.clone(), &self.config.load().rpc)
    }
}
