// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod extract;
pub mod response;
pub mod revocation;
pub mod store;
#[cfg(test)]
pub(crate) mod testing;
pub mod token;
pub mod validate;

pub use extract::{ValidJson, ValidPath, ValidQuery};
pub use response::{created, ok, ok_with_message, ApiResponse, Page, PageQuery};

use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Response for the health endpoint every service exposes.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Router with a single `/health` route answering for `service`.
pub fn health_routes(service: &'static str) -> Router {
    Router::new().route(
        "/health",
        get(move || async move {
            Json(HealthResponse {
                status: "UP".to_string(),
                service: service.to_string(),
            })
        }),
    )
}

/// Bind `addr` and serve `app` until Ctrl+C.
pub async fn serve(app: Router, addr: &str, service: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {service} on {addr}: {e}"))?;

    info!("{} listening on {}", service, listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
