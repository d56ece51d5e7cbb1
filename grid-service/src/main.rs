use anyhow::Result;
use grid_client::Store;
use grid_service::{api, config::AppConfig, metrics_server, notify, observability};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = AppConfig::load()?;
    observability::init_tracing(&cfg.log);

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // One store connection for the life of the process.
    let store = Store::open(&cfg.store.path).await?;
    store.create_schema().await?;
    tracing::info!(path = %cfg.store.path.display(), "store ready");

    let notifier = notify::from_config(cfg.notify.as_ref())?;
    if cfg.notify.is_none() {
        tracing::info!("no [notify] section; outbound sms disabled");
    }

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let app = api::router(api::AppState::new(store.clone(), &cfg.map, notifier));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "grid service listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("store closed, exiting");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
