//! User repository.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for user lookups.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a user.
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Get a user by id.
    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>>;
}
