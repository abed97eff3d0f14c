//! HTTP server for exposing Prometheus metrics.
//!
//! This module provides an Axum-based HTTP server that serves the metrics
//! endpoint for Prometheus scraping, a `/health` endpoint for health checks
//! and a landing page. Scrapes only encode the registry; fresh values are
//! produced by the poller in the background.

use crate::error::{MedusaError, Result};
use crate::metrics::BackupMetrics;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Shared application state.
#[derive(Clone)]
struct AppState {
    metrics: Arc<BackupMetrics>,
    telemetry_path: String,
}

/// Build the router serving `telemetry_path`, `/health` and `/`.
pub fn router(telemetry_path: &str, metrics: Arc<BackupMetrics>) -> Router {
    let state = AppState {
        metrics,
        telemetry_path: telemetry_path.to_string(),
    };

    let mut app = Router::new()
        .route(telemetry_path, get(metrics_handler))
        .route("/health", get(health_handler));
    if telemetry_path != "/" {
        app = app.route("/", get(root_handler));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the HTTP server.
///
/// # Examples
///
/// ```no_run
/// use medusa_exporter::metrics::BackupMetrics;
/// use medusa_exporter::server::start_server;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let metrics = Arc::new(BackupMetrics::new().unwrap());
///     start_server("0.0.0.0:19500", "/metrics", metrics, std::future::pending())
///         .await
///         .unwrap();
/// }
/// ```
pub async fn start_server(
    listen_address: &str,
    telemetry_path: &str,
    metrics: Arc<BackupMetrics>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!("Starting HTTP server on {}", listen_address);
    let listener = TcpListener::bind(listen_address).await?;
    serve(listener, telemetry_path, metrics, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    telemetry_path: &str,
    metrics: Arc<BackupMetrics>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = router(telemetry_path, metrics);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| MedusaError::Server(e.to_string()))?;

    Ok(())
}

/// Handler for the metrics endpoint.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    debug!("Received metrics scrape request");

    match state.metrics.encode() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            warn!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// Handler for /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Handler for root endpoint.
async fn root_handler(State(state): State<AppState>) -> Response {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Medusa exporter</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        h1 {{ color: #476b6b; }}
        a {{ color: #0066cc; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        .info {{ background: #f0f0f0; padding: 15px; border-radius: 5px; margin: 20px 0; }}
    </style>
</head>
<body>
    <h1>Medusa exporter</h1>
    <div class="info">
        <p>Prometheus exporter for Medusa for Apache Cassandra</p>
        <p>Version: {version}</p>
        <ul>
            <li><a href="{path}">{path}</a> - Metrics</li>
            <li><a href="/health">/health</a> - Health check</li>
        </ul>
    </div>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
        path = state.telemetry_path,
    );

    (StatusCode::OK, Html(html)).into_response()
}
