//! Server composition and startup.

use std::sync::Arc;

use anyhow::Context;
use ggserve_core::Config;
use ggserve_engine::{ChannelRegistry, InferenceEngine};
use ggserve_hf::{HttpRepoListing, RepoListing};
use tokio::net::TcpListener;

use crate::routes::create_router;
use crate::state::{AppState, ServerContext};

/// Wire the application state from the configuration and an engine handle.
pub fn build_state(config: Config, engine: Arc<dyn InferenceEngine>) -> AppState {
    let registry = Arc::new(ChannelRegistry::new());
    let listing: Arc<dyn RepoListing> = Arc::new(HttpRepoListing::new());
    Arc::new(ServerContext::new(
        Arc::new(config),
        registry,
        engine,
        listing,
    ))
}

/// Bind the configured address and serve until the process exits.
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let url = state.config.host_url();
    let addr = format!(
        "{}:{}",
        url.host_str().unwrap_or("127.0.0.1"),
        url.port_or_known_default().unwrap_or(8081)
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %listener.local_addr().map_or_else(|_| addr.clone(), |a| a.to_string()),
        version = env!("CARGO_PKG_VERSION"),
        "listening"
    );

    let router = create_router(state);
    axum::serve(listener, router).await.context("server error")
}
