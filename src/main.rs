mod api;
mod attributes;
mod classify;
mod config;
mod error;
mod mapper;
mod metrics;
mod model;
mod service;
mod upstream;
mod url_builder;

use std::sync::Arc;

use anyhow::Context;
use api::AppState;
use config::{AppConfig, LogFormat};
use metrics::Metrics;
use service::ProductService;
use tracing_subscriber::EnvFilter;
use upstream::HttpUpstream;
use url_builder::ProductUrlBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = AppConfig::from_env()?;
    init_tracing(cfg.log_format);

    tracing::debug!(comline = ?cfg.comline, http_client = ?cfg.http_client, "loaded configuration");

    let metrics = Metrics::new()?;
    let urls = ProductUrlBuilder::new(&cfg.comline).context("invalid COMLINE_API_BASE_URL")?;
    let transport =
        HttpUpstream::try_new(&cfg.http_client).context("failed to build upstream client")?;
    let products = ProductService::new(Arc::new(transport), urls, metrics.clone());

    let app = api::router(AppState { products, metrics });

    let listen_addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    tracing::info!(%listen_addr, "starting comline product edge service");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("comline-edge exited cleanly");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term_signal) => term_signal.recv().await,
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                None
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
