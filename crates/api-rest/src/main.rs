//! Standalone health-check server binary.
//!
//! ## Purpose
//! Serves the health API on its own, without polling Telegram.
//!
//! ## Intended use
//! This is the multi-worker server deployment: the runtime gets `SERVER_WORKERS` worker threads
//! and every request is bounded by `REQUEST_TIMEOUT_SECS`. The workspace's main `converter-run`
//! binary runs the bot and the health server together.

use api_rest::{app, cancel_on_signal, serve, AppState};
use api_shared::HealthService;
use converter_core::HealthConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the standalone health server
///
/// # Environment Variables
/// - `PORT`: port bound on all interfaces (default: 8000)
/// - `SERVER_WORKERS`: runtime worker threads (default: 4)
/// - `REQUEST_TIMEOUT_SECS`: per-request timeout (default: 120)
/// - `MAX_WORKERS`: handler pool size reported by the health endpoint (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = HealthConfig::from_env()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.server_workers())
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let addr = cfg.bind_addr();
        tracing::info!(
            "-- Starting converter health server on {} ({} workers, {}s timeout)",
            addr,
            cfg.server_workers(),
            cfg.request_timeout().as_secs()
        );

        let shutdown = CancellationToken::new();
        cancel_on_signal(shutdown.clone());

        let state = AppState::new(HealthService::new(cfg.workers()));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(
            listener,
            app(state, Some(cfg.request_timeout())),
            shutdown,
        )
        .await?;

        Ok::<(), anyhow::Error>(())
    })
}
