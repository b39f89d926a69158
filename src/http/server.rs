//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request id, tracing, timeout, limits, metrics)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::TimeDelta;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security;
use crate::store::RecordStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub recent_window: TimeDelta,
}

/// HTTP server for the ingest service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    store: Arc<RecordStore>,
}

impl HttpServer {
    /// Create a new HTTP server with an empty store.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_store(config, Arc::new(RecordStore::new()))
    }

    /// Create a new HTTP server around an existing store.
    pub fn with_store(config: ServiceConfig, store: Arc<RecordStore>) -> Self {
        let state = AppState {
            store: store.clone(),
            recent_window: config.store.recent_window(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/api/receive", post(handlers::receive))
            .route("/api/consultar", get(handlers::list_all))
            .route("/api/consultar/recentes", get(handlers::recent))
            .route("/api/consultar/periodo", get(handlers::period))
            .route("/api/consultar/{id}", get(handlers::get_by_id))
            .route(
                "/api/consultar/categoria/{categoria}",
                get(handlers::by_category),
            )
            .route(
                "/api/consultar/categoria/{categoria}/ultimo",
                get(handlers::latest_in_category),
            )
            .route("/api/estatisticas", get(handlers::statistics))
            .route("/api/buscar", get(handlers::search))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests));

        let router = security::headers::apply(router, &config.security);
        security::limits::apply(router, &config.security)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown_rx` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!(records = self.store.len(), "HTTP server stopped");
        Ok(())
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared record store.
    pub fn store(&self) -> Arc<RecordStore> {
        self.store.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
