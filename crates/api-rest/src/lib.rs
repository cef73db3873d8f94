//! # API REST
//!
//! Health-check HTTP API for the converter bot.
//!
//! Handles:
//! - `GET /` and `GET /health` with axum
//! - The OpenAPI document at `/api-docs/openapi.json`
//! - Serving with graceful shutdown and an optional per-request timeout
//! - Turning Ctrl-C and SIGTERM into a shutdown request
//!
//! Uses `api-shared` for the response type. Every other path is a 404.

#![warn(rust_2018_idioms)]

use api_shared::{HealthRes, HealthService};
use axum::{extract::State, response::Json, routing::get, Router};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Application state shared across health handlers.
#[derive(Clone)]
pub struct AppState {
    health: HealthService,
}

impl AppState {
    pub fn new(health: HealthService) -> Self {
        Self { health }
    }
}

#[derive(OpenApi)]
#[openapi(paths(health), components(schemas(HealthRes)))]
struct ApiDoc;

/// Build the health router.
///
/// With `request_timeout` set, requests taking longer are answered with `408 Request Timeout`.
/// Request/response tracing is emitted at debug level only.
pub fn app(state: AppState, request_timeout: Option<Duration>) -> Router {
    let router = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    with_request_timeout(router, request_timeout)
}

fn with_request_timeout(router: Router, request_timeout: Option<Duration>) -> Router {
    match request_timeout {
        Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
        None => router,
    }
}

/// Serve `router` on `listener` until `shutdown` is cancelled.
///
/// # Errors
/// Returns an error if the HTTP server fails while running.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("health check server running on {}", addr);
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// Cancel `shutdown` when the process receives Ctrl-C or SIGTERM.
///
/// `docker stop` sends SIGTERM to PID 1, which has no default handler. A listener that fails to
/// install is logged and never fires.
pub fn cancel_on_signal(shutdown: CancellationToken) -> JoinHandle<()> {
    #[cfg(unix)]
    let terminate = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(signal) => Some(signal),
        Err(e) => {
            tracing::error!("failed to listen for SIGTERM: {}", e);
            None
        }
    };

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let sigterm = async move {
            match terminate {
                Some(mut signal) => {
                    signal.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("shutdown requested (Ctrl-C)"),
            _ = sigterm => tracing::info!("shutdown requested (SIGTERM)"),
        }
        shutdown.cancel();
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Returns the health status of the converter bot, also served on `/`.
/// This endpoint is used for container health checks.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(state.health.check_health())
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
