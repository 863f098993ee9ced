//! Stored image repository.

use crate::error::MetadataResult;
use crate::models::StoredImageRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for image provenance records.
#[async_trait]
pub trait ImageRepo: Send + Sync {
    /// Record an uploaded image.
    async fn record_image(&self, image: &StoredImageRow) -> MetadataResult<()>;

    /// Look up a prior upload with the same content hash and size.
    async fn find_image_by_hash(
        &self,
        blog_id: Uuid,
        content_hash: &str,
        size_bytes: i64,
    ) -> MetadataResult<Option<StoredImageRow>>;

    /// Get an image record by object key.
    async fn get_image_by_key(&self, object_key: &str) -> MetadataResult<Option<StoredImageRow>>;
}
