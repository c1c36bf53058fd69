mod config;
mod error;
mod middleware;
mod service;
mod types;

use anyhow::Context;
use config::ServerConfig;
use quickclip_core::{Store, StoreConfig};
use service::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickclip_server=info,quickclip_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let addr = config.bind_addr()?;

    let store = Store::with_config(
        StoreConfig::default().with_cleanup_interval(config.cleanup_interval),
    );
    let app = service::router(AppState::new(
        store.clone(),
        config.limits,
        config.environment,
    ));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!(
        "QuickClip API listening on {} ({})",
        addr,
        config.environment.as_str()
    );
    tracing::info!(
        "   Timer range: {}-{}s, max text: {} chars, sweep every {}s",
        config.limits.min_timer,
        config.limits.max_timer,
        config.limits.max_text_length,
        config.cleanup_interval.as_secs()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    store.shutdown();
    tracing::info!("Shutting down QuickClip API ({} clips dropped)", store.len());

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
