use anyhow::Context;
use encart_api::{app, AppState};
use encart_shared::SystemClock;
use encart_store::{app_config::Config, CacheSweeper, WebhookSearchClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encart_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Encart API on port {}", config.server.port);

    let client = WebhookSearchClient::new(&config.webhook).context("Failed to build search client")?;
    let app_state = AppState::new(&config, Arc::new(client), Arc::new(SystemClock));

    let mut sweeper = CacheSweeper::start(
        app_state.caches.sweepables(),
        Duration::from_secs(config.cache.sweep_interval_secs.max(1)),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    sweeper.stop();
    tracing::info!("Encart API stopped");
    Ok(())
}
