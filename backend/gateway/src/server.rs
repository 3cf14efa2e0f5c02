//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use iris_pipeline::Assistant;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub assistant: Arc<Assistant>,
}

impl GatewayState {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant: Arc::new(assistant),
        }
    }
}

/// Build the gateway routes with a request body cap of `max_upload_bytes`.
pub fn router(state: GatewayState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/describe", post(routes::describe))
        .route("/api/speak", post(routes::speak))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Starts the Axum HTTP server and runs until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(
    addr: SocketAddr,
    state: GatewayState,
    max_upload_bytes: usize,
) -> Result<()> {
    let app = router(state, max_upload_bytes);

    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
