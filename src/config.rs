use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::stats::metric::Metric;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Node JSON-RPC connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_scheme")]
    pub scheme: String,
    /// Empty means "not configured"; required by `serve`
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_rpc_timeout")]
    pub timeout_seconds: u64,
}

impl RpcConfig {
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    /// Blocks between halvings; zero means "not configured"
    #[serde(default)]
    pub halving_interval: u64,
    /// Block time assumed when projecting the halving ETA
    #[serde(default = "default_target_block_time")]
    pub target_block_time_seconds: f64,
    /// Lookback passed to `getnetworkhashps`
    #[serde(default = "default_hashrate_blocks")]
    pub hashrate_blocks: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Base URL of the stats API the pollers talk to
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default)]
    pub bindings: ElementBindings,
    #[serde(default)]
    pub countdown: CountdownConfig,
}

/// Path suffixes appended to `api_base_url`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_halving_endpoint")]
    pub halving: String,
    #[serde(default = "default_height_endpoint")]
    pub height: String,
    #[serde(default = "default_difficulty_endpoint")]
    pub difficulty: String,
    #[serde(default = "default_hashrate_endpoint")]
    pub hashrate: String,
    #[serde(default = "default_avg_block_time_endpoint")]
    pub avg_block_time: String,
}

impl EndpointsConfig {
    pub fn suffix(&self, metric: Metric) -> &str {
        match metric {
            Metric::Height => &self.height,
            Metric::Difficulty => &self.difficulty,
            Metric::Hashrate => &self.hashrate,
            Metric::AvgBlockTime => &self.avg_block_time,
        }
    }
}

/// Display target each metric is rendered into
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElementBindings {
    #[serde(default = "default_height_target")]
    pub height: String,
    #[serde(default = "default_difficulty_target")]
    pub difficulty: String,
    #[serde(default = "default_hashrate_target")]
    pub hashrate: String,
    #[serde(default = "default_avg_block_time_target")]
    pub avg_block_time: String,
}

impl ElementBindings {
    pub fn target(&self, metric: Metric) -> &str {
        match metric {
            Metric::Height => &self.height,
            Metric::Difficulty => &self.difficulty,
            Metric::Hashrate => &self.hashrate,
            Metric::AvgBlockTime => &self.avg_block_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CountdownConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_ms: u64,
    /// State used when the first halving fetch fails
    #[serde(default)]
    pub fallback: Option<CountdownFallback>,
    #[serde(default)]
    pub on_refresh_failure: RefreshFailurePolicy,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CountdownFallback {
    pub eta_seconds: u64,
    pub blocks_remaining: u64,
}

/// What a running countdown does when a periodic refresh fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshFailurePolicy {
    #[default]
    KeepRunning,
    Teardown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            scheme: default_rpc_scheme(),
            host: String::new(),
            port: 0,
            user: String::new(),
            password: String::new(),
            timeout_seconds: default_rpc_timeout(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            halving_interval: 0,
            target_block_time_seconds: default_target_block_time(),
            hashrate_blocks: default_hashrate_blocks(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            endpoints: EndpointsConfig::default(),
            refresh_interval_ms: default_refresh_interval_ms(),
            placeholder: default_placeholder(),
            bindings: ElementBindings::default(),
            countdown: CountdownConfig::default(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            halving: default_halving_endpoint(),
            height: default_height_endpoint(),
            difficulty: default_difficulty_endpoint(),
            hashrate: default_hashrate_endpoint(),
            avg_block_time: default_avg_block_time_endpoint(),
        }
    }
}

impl Default for ElementBindings {
    fn default() -> Self {
        Self {
            height: default_height_target(),
            difficulty: default_difficulty_target(),
            hashrate: default_hashrate_target(),
            avg_block_time: default_avg_block_time_target(),
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_interval_ms(),
            fallback: None,
            on_refresh_failure: RefreshFailurePolicy::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8032
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_rpc_scheme() -> String {
    "http".to_string()
}

fn default_rpc_timeout() -> u64 {
    15
}

fn default_target_block_time() -> f64 {
    120.0
}

fn default_hashrate_blocks() -> i64 {
    120
}

fn default_api_base_url() -> String {
    "http://localhost:8032".to_string()
}

fn default_refresh_interval_ms() -> u64 {
    30_000
}

fn default_placeholder() -> String {
    "Loading...".to_string()
}

fn default_halving_endpoint() -> String {
    "/halving".to_string()
}

fn default_height_endpoint() -> String {
    "/height".to_string()
}

fn default_difficulty_endpoint() -> String {
    "/difficulty".to_string()
}

fn default_hashrate_endpoint() -> String {
    "/hashrate".to_string()
}

fn default_avg_block_time_endpoint() -> String {
    "/avg-block-time".to_string()
}

fn default_height_target() -> String {
    "block-height".to_string()
}

fn default_difficulty_target() -> String {
    "difficulty".to_string()
}

fn default_hashrate_target() -> String {
    "network-hashrate".to_string()
}

fn default_avg_block_time_target() -> String {
    "avg-block-time".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Load configuration from a TOML file layered with `PALLADIUM__*` environment variables
///
/// Without an explicit path, `palladium.toml` in the working directory is used
/// if present. Only the site section is validated here; the API service checks
/// its extra requirements with [`validate_service_config`].
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("palladium").required(false),
    };

    let config = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("PALLADIUM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    let base = reqwest::Url::parse(&cfg.site.api_base_url)
        .map_err(|e| anyhow::anyhow!("Invalid site.api_base_url '{}': {}", cfg.site.api_base_url, e))?;
    if !matches!(base.scheme(), "http" | "https") {
        anyhow::bail!("site.api_base_url must use http or https, got '{}'", base.scheme());
    }

    if cfg.site.refresh_interval_ms == 0 {
        anyhow::bail!("site.refresh_interval_ms must be positive");
    }

    if cfg.site.countdown.refresh_ms == 0 {
        anyhow::bail!("site.countdown.refresh_ms must be positive");
    }

    for metric in Metric::ALL {
        if cfg.site.bindings.target(metric).is_empty() {
            anyhow::bail!("Display target for {} cannot be empty", metric);
        }
    }

    Ok(())
}

/// Requirements that only apply when serving the stats API
pub fn validate_service_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.rpc.host.is_empty() {
        anyhow::bail!("rpc.host must be set");
    }

    if cfg.rpc.port == 0 {
        anyhow::bail!("rpc.port must be set");
    }

    if cfg.chain.halving_interval == 0 {
        anyhow::bail!("chain.halving_interval must be positive");
    }

    let block_time = cfg.chain.target_block_time_seconds;
    if block_time.is_nan() || block_time <= 0.0 {
        anyhow::bail!("chain.target_block_time_seconds must be positive");
    }

    if !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("metrics.endpoint must start with '/'");
    }

    Ok(())
}
