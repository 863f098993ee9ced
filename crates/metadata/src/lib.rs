//! Metadata layer for the Ghost Admin API gateway.
//!
//! Holds blogs, users, issued credentials, image provenance records, and the
//! minimal post write path, behind repository traits so handlers never touch
//! SQL directly.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use models::{BlogRow, GhostTokenRow, PostRow, StoredImageRow, UserRow};
pub use repos::{BlogRepo, ImageRepo, PostRepo, TokenRepo, UserRepo};
pub use store::{MetadataStore, SqliteStore};

use lantern_core::config::MetadataConfig;
use std::sync::Arc;

/// Build a store from configuration and run migrations.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let store = SqliteStore::open(path).await?;
            store.migrate().await?;
            tracing::info!(path = %path.display(), "opened sqlite metadata store");
            Ok(Arc::new(store))
        }
    }
}
