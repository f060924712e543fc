use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use palladium_stats::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();
    let command = args.get_command();
    let config_path = args.config.as_deref();

    // Commands report config errors themselves; logging just falls back to defaults
    let server = config::load_config(config_path)
        .map(|cfg| cfg.server)
        .unwrap_or_default();

    // The dashboard owns the terminal; log only when RUST_LOG asks for it
    let log_level = match command {
        cli::Commands::Watch { .. } => "off",
        _ => server.log_level.as_str(),
    };
    init_tracing(log_level, server.log_format == "json");

    // Dispatch to appropriate command handler
    match command {
        cli::Commands::Serve => {
            commands::serve::execute(args.config.clone()).await?;
        }
        cli::Commands::Watch { url, interval } => {
            commands::watch::execute(config_path, url, interval).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(config_path)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(config_path)?,
            cli::ConfigCommands::Validate => commands::config::validate(config_path)?,
        },
        cli::Commands::Version => {
            println!("Palladium Stats v{}", env!("CARGO_PKG_VERSION"));
            println!("Rust {}", env!("CARGO_PKG_RUST_VERSION"));
        }
    }

    Ok(())
}
