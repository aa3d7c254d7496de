use anyhow::{Context, Result};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use snaplink::analytics::{AnalyticsAggregator, ClickRecorder};
use snaplink::config::Config;
use snaplink::shortener::{CodeGenerator, LinkRegistry};
use snaplink::{api, redirect, storage};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    let storage = storage::connect(&config.database).await?;

    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    let registry = Arc::new(LinkRegistry::new(
        Arc::clone(&storage),
        CodeGenerator::new(config.short_code_length),
    ));
    let aggregator = Arc::new(AnalyticsAggregator::new(Arc::clone(&storage)));
    let recorder = Arc::new(ClickRecorder::spawn(
        Arc::clone(&aggregator),
        config.analytics.click_queue_size,
    ));

    let api_router = api::create_api_router(
        Arc::clone(&registry),
        Arc::clone(&aggregator),
        config.base_url.clone(),
    );
    let redirect_router = redirect::create_redirect_router(
        Arc::clone(&registry),
        Arc::clone(&recorder),
        config.analytics.clone(),
        config.redirect_status,
    );

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API server to {api_addr}"))?;
    info!("🚀 API server listening on http://{}", api_addr);

    let redirect_addr = format!(
        "{}:{}",
        config.redirect_server.host, config.redirect_server.port
    );
    let redirect_listener = tokio::net::TcpListener::bind(&redirect_addr)
        .await
        .with_context(|| format!("failed to bind redirect server to {redirect_addr}"))?;
    info!("🚀 Redirect server listening on http://{}", redirect_addr);
    info!("   - Short links are published under {}", config.base_url);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        let _ = shutdown_tx.send(true);
    });

    let wait_for_shutdown = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.wait_for(|stop| *stop).await;
    };

    tokio::try_join!(
        axum::serve(
            api_listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()))
        .into_future(),
        axum::serve(
            redirect_listener,
            redirect_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .into_future(),
    )?;

    recorder.shutdown().await;
    storage.close().await;
    info!("Shutdown complete");

    Ok(())
}
