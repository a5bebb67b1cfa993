//! Health and status endpoint for uptime monitors.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::bot::data::Data;

#[derive(Debug, Serialize)]
struct Status {
    status: &'static str,
    guild_count: usize,
    uptime_seconds: u64,
}

async fn status(State(data): State<Arc<Data>>) -> Json<Status> {
    Json(Status {
        status: "online",
        guild_count: data.guild_count(),
        uptime_seconds: data.started_at.elapsed().as_secs(),
    })
}

async fn health() -> &'static str {
    "ok"
}

async fn ping() -> &'static str {
    "bot online!"
}

fn router(data: Arc<Data>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .with_state(data)
}

/// Serve the status routes on `0.0.0.0:port` until the process exits
pub async fn run_http_server(port: u16, data: Arc<Data>) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Health endpoint listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind health endpoint on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, router(data)).await {
        tracing::error!("Health endpoint error: {}", e);
    }
}
