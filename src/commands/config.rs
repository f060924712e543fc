use anyhow::Result;
use colored::Colorize;
use palladium_stats::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with RPC credentials masked
pub fn show(config_path: Option<&Path>) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
///
/// Runs the same checks as `serve` without binding anything
pub fn validate(config_path: Option<&Path>) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;
    config::validate_service_config(&cfg)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Node RPC: {}", cfg.rpc.url());
    println!("  Stats API: {}", cfg.site.api_base_url);
    println!("  Bound targets: {}", bound_targets(&cfg));

    info!("Configuration validation successful");
    Ok(())
}

/// Mask the RPC credentials for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.rpc.user = mask_secret(&sanitized.rpc.user);
    sanitized.rpc.password = mask_secret(&sanitized.rpc.password);
    sanitized
}

/// Keep the first and last two characters of a secret
///
/// Example: "rpcpassword" -> "rp...rd"
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 6 {
        // Too short to mask meaningfully
        return "***".to_string();
    }

    let prefix: String = chars[..2].iter().collect();
    let suffix: String = chars[chars.len() - 2..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// Count the display targets the poller and countdown write to
fn bound_targets(cfg: &Config) -> usize {
    let metric_targets = palladium_stats::stats::Metric::ALL
        .iter()
        .filter(|metric| !cfg.site.bindings.target(**metric).is_empty())
        .count();
    // days, hours, minutes, seconds, blocks remaining
    metric_targets + 5
}
