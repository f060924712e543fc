use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "palladium-stats", version, about = "Palladium network stats API and dashboard")]
pub struct Cli {
    /// Configuration file path (defaults to ./palladium.toml if present)
    #[arg(short, long, global = true, env = "PALLADIUM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the stats API backed by the node's JSON-RPC (default)
    Serve,

    /// Display live network stats and the halving countdown
    Watch {
        /// Stats API base URL (overrides site.api_base_url)
        #[arg(short, long)]
        url: Option<String>,

        /// Refresh interval in seconds (overrides site.refresh_interval_ms)
        #[arg(short, long)]
        interval: Option<f64>,
    },

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Serve if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli {
            config: None,
            command: None,
        };

        assert!(matches!(cli.get_command(), Commands::Serve));
    }

    #[test]
    fn test_cli_parsing_watch_with_overrides() {
        let args = vec!["palladium-stats", "watch", "--url", "http://localhost:9000", "-i", "5"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Watch { url, interval } => {
                assert_eq!(url.as_deref(), Some("http://localhost:9000"));
                assert_eq!(interval, Some(5.0));
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_config() {
        let args = vec!["palladium-stats", "config", "show", "--config", "/etc/palladium.toml"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/etc/palladium.toml")));
        match cli.get_command() {
            Commands::Config { action } => {
                assert!(matches!(action, ConfigCommands::Show));
            }
            _ => panic!("Expected Config command"),
        }
    }
}
