//! Application state shared across handlers.

use crate::chunks::ChunkSessionMap;
use lantern_core::config::AppConfig;
use lantern_metadata::MetadataStore;
use lantern_storage::ObjectStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// In-flight chunked upload sessions.
    pub chunks: ChunkSessionMap,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            metadata,
            chunks: ChunkSessionMap::new(),
        }
    }

    /// Public URL for a stored object key.
    pub fn content_url(&self, object_key: &str) -> String {
        format!(
            "{}/content/{}",
            self.config.server.public_url.trim_end_matches('/'),
            object_key
        )
    }
}
