//! Ghost token repository.

use crate::error::MetadataResult;
use crate::models::GhostTokenRow;
use async_trait::async_trait;

/// Repository for issued Admin API credentials.
///
/// Verification is read-only apart from lazy expiry cleanup, so the surface
/// is deliberately small: create, look up, delete.
#[async_trait]
pub trait TokenRepo: Send + Sync {
    /// Persist a freshly issued credential.
    async fn create_token(&self, token: &GhostTokenRow) -> MetadataResult<()>;

    /// Look up the exact `"id:secret"` string.
    async fn get_token(&self, token: &str) -> MetadataResult<Option<GhostTokenRow>>;

    /// Find the credential whose id-half matches a JWT `kid`.
    async fn find_token_by_key_id(&self, key_id: &str) -> MetadataResult<Option<GhostTokenRow>>;

    /// Delete the exact credential. Used for lazy expiry cleanup.
    async fn delete_token(&self, token: &str) -> MetadataResult<()>;

    /// Delete by key id (revocation). Returns how many rows were removed.
    async fn delete_token_by_key_id(&self, key_id: &str) -> MetadataResult<u64>;
}
