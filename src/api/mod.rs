//! HTTP health endpoints
//!
//! Hosting platforms poll the bot over HTTP to decide whether it is alive.
//!
//! - `GET /` - plain-text liveness string
//! - `GET /health` - JSON status with uptime and conversation count

/// Request handlers.
pub mod handlers;
/// Router construction.
pub mod routes;

use crate::types::{BotError, Result};
use crate::AppState;
use tracing::info;

/// Binds `host:port` and serves the health router until the task is dropped.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BotError::Http(format!("Failed to bind {}: {}", addr, e)))?;

    info!(%addr, "Health server listening");

    axum::serve(listener, routes::create_router(state))
        .await
        .map_err(|e| BotError::Http(format!("Server error: {}", e)))
}
