//! Shared map session server.
//!
//! Run with: cargo run -p viewsync-server -- --port 3000
//!
//! Map clients connect to `ws://<host>:<port>/ws`; `/status` reports the
//! online count and current controller.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use viewsync_session::SessionHub;
use viewsync_transport::websocket::{WsState, create_ws_router};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::parse();
    let hub = SessionHub::new(config.session_config());

    // Build router
    let app = create_ws_router(WsState::new(hub).with_idle_timeout(config.idle_timeout()))
        .layer(config.cors_layer()?)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server listening on http://{addr}");
    if let Some(limit) = config.idle_timeout() {
        tracing::info!("Idle connections dropped after {limit:?}");
    }

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
