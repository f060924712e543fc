use anyhow::Result;
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::config::Config;

#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Stop accepting connections and drain in-flight requests
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Configuration reload
#[cfg(unix)]
pub fn setup_signal_handlers(
    config: Arc<ArcSwap<Config>>,
    config_path: Option<PathBuf>,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let handle = tokio::spawn(async move {
        loop {
            let stop = tokio::select! {
                _ = sigterm.recv() => Some("SIGTERM"),
                _ = sigint.recv() => Some("SIGINT"),
                _ = sighup.recv() => None,
            };

            if let Some(name) = stop {
                info!(signal = name, "Stopping stats API");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
                break;
            }

            info!("SIGHUP received, reloading {}", describe_path(config_path.as_deref()));
            match reload_config(&config, config_path.as_deref()) {
                Ok(()) => info!("Configuration reloaded"),
                Err(e) => error!(error = %e, "Reload failed, keeping the running configuration"),
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Non-unix targets only get Ctrl+C; there is no reload signal
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _config: Arc<ArcSwap<Config>>,
    _config_path: Option<PathBuf>,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        // On Windows, only Ctrl+C is supported
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, initiating shutdown");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    Ok((shutdown_tx, handle))
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "palladium.toml".to_string())
}

/// Reload configuration atomically
///
/// The new configuration is fully validated before the swap; on any error the
/// old configuration stays in place. Host and port changes need a restart.
pub fn reload_config(config: &Arc<ArcSwap<Config>>, path: Option<&Path>) -> Result<()> {
    let new_config = crate::config::load_config(path)?;
    crate::config::validate_service_config(&new_config)?;

    let current = config.load();
    if current.server.host != new_config.server.host || current.server.port != new_config.server.port {
        tracing::warn!("Listen address changed; restart required for it to take effect");
    }

    info!(
        rpc = %new_config.rpc.url(),
        halving_interval = new_config.chain.halving_interval,
        "New configuration loaded"
    );

    config.store(Arc::new(new_config));
    Ok(())
}
