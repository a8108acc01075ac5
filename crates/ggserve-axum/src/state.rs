//! Shared application state type.

use std::sync::Arc;

use ggserve_core::Config;
use ggserve_engine::{ChannelRegistry, EngineRunner, InferenceEngine};
use ggserve_hf::{Puller, RepoListing};

/// Services shared by all handlers.
pub struct ServerContext {
    /// Process configuration, read-only.
    pub config: Arc<Config>,
    /// Correlation channel registry.
    pub registry: Arc<ChannelRegistry>,
    /// Serialized engine access.
    pub runner: EngineRunner,
    /// Model puller.
    pub puller: Puller,
}

impl ServerContext {
    /// Wire the context from its collaborators.
    pub fn new(
        config: Arc<Config>,
        registry: Arc<ChannelRegistry>,
        engine: Arc<dyn InferenceEngine>,
        listing: Arc<dyn RepoListing>,
    ) -> Self {
        let runner = EngineRunner::new(engine, Arc::clone(&registry), Arc::clone(&config));
        let puller = Puller::new(listing, config.model_dir.clone());
        Self {
            config,
            registry,
            runner,
            puller,
        }
    }
}

/// Application state shared across all handlers.
pub type AppState = Arc<ServerContext>;
