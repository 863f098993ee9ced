//! Blob storage layer for the Ghost Admin API gateway.
//!
//! Uploaded images land here under content-addressed keys. The trait keeps
//! the server decoupled from the backend; only a filesystem backend ships
//! today.

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use traits::{ObjectMeta, ObjectStore};

use lantern_core::config::StorageConfig;
use std::sync::Arc;

/// Build a storage backend from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            tracing::info!(path = %path.display(), "opened filesystem blob store");
            Ok(Arc::new(backend))
        }
    }
}
