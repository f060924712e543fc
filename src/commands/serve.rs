use anyhow::Result;
use colored::Colorize;
use palladium_stats::{config, server};
use std::path::PathBuf;
use tracing::info;

/// Execute the serve command
///
/// Loads and checks the configuration, then blocks in the server until a
/// shutdown signal arrives. The path is kept so SIGHUP can reload from it.
pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", "Starting Palladium stats API...".green());

    let cfg = config::load_config(config_path.as_deref())?;
    config::validate_service_config(&cfg)?;

    info!(
        rpc = %cfg.rpc.url(),
        halving_interval = cfg.chain.halving_interval,
        "Configuration loaded"
    );

    server::start_server(cfg, config_path).await?;

    Ok(())
}
