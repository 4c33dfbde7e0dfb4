//! provpath HTTP service.
//!
//! # Configuration
//!
//! - `PROVPATH_DATA_DIR` - directory holding `provinces.json` and `adjacency.json`
//!   (default: the platform data directory)
//! - `PROVPATH_ROUTING_*` - external routing backend, see `ResolverConfig`
//! - `RUST_LOG` - log level (default: info)
//! - `LOG_FORMAT` - json (default) or text
//! - `METRICS_ENABLED`, `METRICS_PATH` - Prometheus endpoint
//! - `SERVICE_PORT` - HTTP port (default: 8080)

use std::env;
use std::net::SocketAddr;

use tracing::{error, info};

use provpath_lib::{ResolverConfig, resolve_data_dir};
use provpath_service::app;
use provpath_service_shared::{
    AppState, LoggingConfig, MetricsConfig, init_logging, init_metrics,
};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("provpath-service");
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let data_dir = resolve_data_dir(None)?;
    let resolver_config = ResolverConfig::from_env();

    info!(
        data_dir = %data_dir.display(),
        port,
        routing_enabled = resolver_config.enabled,
        "starting provpath service"
    );

    // Dataset loading is blocking file I/O.
    let load_dir = data_dir.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(&load_dir, &resolver_config))
        .await?
        .map_err(|e| {
            error!(error = %e, path = %data_dir.display(), "failed to load application state");
            e
        })?;

    let app = app(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
