//! Post repository.

use crate::error::MetadataResult;
use crate::models::PostRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for the gateway's minimal post write path.
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Create a post.
    async fn create_post(&self, post: &PostRow) -> MetadataResult<()>;

    /// Update a post's content and title.
    async fn update_post(&self, post: &PostRow) -> MetadataResult<()>;

    /// Get a post by id.
    async fn get_post(&self, post_id: Uuid) -> MetadataResult<Option<PostRow>>;
}
