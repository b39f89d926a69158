//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener
//! - Build the HTTP server around a fresh record store

use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::observability::metrics;

/// A server ready to accept traffic.
pub struct Started {
    pub server: HttpServer,
    pub listener: TcpListener,
}

/// Bring up every subsystem in dependency order.
///
/// A metrics exporter that fails to start is logged and skipped; failing to
/// bind the listener is fatal.
pub async fn start(config: ServiceConfig) -> std::io::Result<Started> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_size = config.security.max_body_size,
        recent_window_hours = config.store.recent_window_hours,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    Ok(Started { server, listener })
}
