//! grantbridge HTTP server entry point.
//!
//! Serves the grant search, featured grants, cache sync and contact routes.
//! Logs are JSON on stderr, filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use grantbridge_core::AppConfig;

mod error;
mod routes;
mod schedule;
mod state;
mod sync;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let address = config.bind_address();

    let state = AppState::from_config(config).await.context("initializing state")?;
    let scheduler = schedule::maybe_start(&state).await?;

    let app = routes::router(state);
    let listener = TcpListener::bind(&address).await.with_context(|| format!("binding {address}"))?;
    tracing::info!(%address, "grantbridge server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if let Some(mut sched) = scheduler {
        if let Err(e) = sched.shutdown().await {
            tracing::warn!(error = %e, "scheduler shutdown failed");
        }
    }

    tracing::info!("grantbridge server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
