use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::setup_signal_handlers,
};

/// Start the stats API server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Sets up signal handlers for graceful shutdown and config reload
/// 3. Creates the Axum application
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP for reload)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path)?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(&config, AppState::new(config_swap), metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting Palladium stats API on {}", addr);
    info!(
        "Node RPC at {}, halving interval {} blocks",
        config.rpc.url(),
        config.chain.halving_interval
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    config: &Config,
    app_state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
) -> Router {
    let chain_routes = Router::new()
        .route("/height", get(handlers::chain::height))
        .route("/difficulty", get(handlers::chain::difficulty))
        .route("/hashrate", get(handlers::chain::hashrate))
        .route("/avg-block-time", get(handlers::chain::avg_block_time))
        .route("/halving", get(handlers::chain::halving))
        .with_state(app_state);

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(chain_routes);

    if let Some(handle) = metrics_handle {
        router = router.merge(
            Router::new()
                .route(&config.metrics.endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    router
        .layer(middleware::from_fn(track_requests))
        // The site calls the API from the browser on another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Count every request by matched route and response status
async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_api_request(&endpoint, response.status().as_u16());
    response
}
