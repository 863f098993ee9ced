//! Blog repository.

use crate::error::MetadataResult;
use crate::models::BlogRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for blog lookups.
///
/// The gateway only reads blogs; `create_blog` exists for bootstrap and
/// tests, creation proper belongs to the dashboard CRUD layer.
#[async_trait]
pub trait BlogRepo: Send + Sync {
    /// Create a blog.
    async fn create_blog(&self, blog: &BlogRow) -> MetadataResult<()>;

    /// Get a blog by id.
    async fn get_blog(&self, blog_id: Uuid) -> MetadataResult<Option<BlogRow>>;

    /// Exact match on the custom domain field.
    async fn get_blog_by_custom_domain(&self, domain: &str) -> MetadataResult<Option<BlogRow>>;

    /// Exact match on the subdomain field.
    async fn get_blog_by_subdomain(&self, subdomain: &str) -> MetadataResult<Option<BlogRow>>;

    /// Exact match on the slug pair. When `user_slug` is absent the blog slug
    /// must be unambiguous on its own.
    async fn get_blog_by_slugs(
        &self,
        user_slug: Option<&str>,
        blog_slug: &str,
    ) -> MetadataResult<Option<BlogRow>>;
}
