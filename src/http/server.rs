//! Status and metrics server.
//!
//! # Responsibilities
//! - `GET /status`: liveness, always `OK`
//! - `GET /metrics`: Prometheus text exposition
//!
//! # Design Decisions
//! - Runs beside the monitor on its own task; nothing in the monitor
//!   depends on it
//! - Bind errors surface at startup, serve errors are only logged

use axum::{extract::State, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::lifecycle::Shutdown;

/// HTTP server exposing liveness and metrics.
pub struct StatusServer {
    router: Router,
}

impl StatusServer {
    pub fn new(metrics: PrometheusHandle) -> Self {
        Self {
            router: Self::build_router(metrics),
        }
    }

    fn build_router(metrics: PrometheusHandle) -> Router {
        Router::new()
            .route("/status", get(status_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(metrics)
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) {
        match listener.local_addr() {
            Ok(addr) => tracing::info!(address = %addr, "Status server listening"),
            Err(e) => tracing::warn!(error = %e, "Status server listening on unknown address"),
        }

        if let Err(e) = axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await
        {
            tracing::error!(error = %e, "Status server failed");
        }
    }
}

async fn status_handler() -> &'static str {
    "OK"
}

async fn metrics_handler(State(metrics): State<PrometheusHandle>) -> String {
    metrics.render()
}
