use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use api_shared::HealthService;
use converter_core::{
    ConverterBot, CoreConfig, MongoLinkStore, Poller, TelegramClient, ViralboxShortener,
};

/// Main entry point for the converter bot
///
/// Runs the Telegram polling loop and, unless disabled, the health-check server:
/// - health server on `0.0.0.0:8000` (configurable via PORT)
/// - message handlers bounded by MAX_WORKERS (default 10)
///
/// With `HEALTH_SERVER_ENABLED=false` only the bot runs and no port is bound.
///
/// # Environment Variables
/// - `CONVERTER_BOT_TOKEN`: Telegram bot token (required)
/// - `MONGODB_URI`: MongoDB connection string (required)
/// - `MONGO_DB_NAME`: database name (default: "viralbox_db")
/// - `VIRALBOX_DOMAIN`: accepted link domain (default: "viralbox.in")
///
/// # Returns
/// * `Ok(())` - After Ctrl-C or SIGTERM, once in-flight messages finish
/// * `Err(anyhow::Error)` - If configuration, MongoDB connection or server startup fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("converter_run=info".parse()?)
                .add_directive("converter_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env()?;

    let store = Arc::new(MongoLinkStore::connect(cfg.mongo()).await?);
    let telegram = Arc::new(TelegramClient::from_config(cfg.telegram())?);
    let shortener = Arc::new(ViralboxShortener::from_config(cfg.shortener())?);

    let bot = ConverterBot::new(
        telegram.clone(),
        shortener,
        store,
        cfg.shortener().domain(),
    );
    let poller = Poller::new(
        telegram,
        bot,
        cfg.max_workers(),
        cfg.telegram().poll_timeout(),
    );

    let shutdown = CancellationToken::new();
    api_rest::cancel_on_signal(shutdown.clone());

    // Bind before polling so a taken port fails startup.
    let health_server = if cfg.health().enabled() {
        let listener = TcpListener::bind(cfg.health().bind_addr()).await?;
        let router = api_rest::app(AppState::new(HealthService::new(cfg.max_workers())), None);
        Some(tokio::spawn(api_rest::serve(
            listener,
            router,
            shutdown.clone(),
        )))
    } else {
        tracing::info!("health check server disabled");
        None
    };

    poller.run(shutdown.clone()).await;
    shutdown.cancel();

    if let Some(server) = health_server {
        server.await??;
    }

    Ok(())
}
