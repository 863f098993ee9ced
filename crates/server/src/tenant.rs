//! Tenant resolution.
//!
//! The front-door router has already parsed the Host header into query
//! parameters; resolution here is a priority pick over those fields followed
//! by an exact metadata lookup.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use lantern_core::tenant::{TenantKey, TenantLocator};
use lantern_metadata::models::BlogRow;
use serde::Deserialize;

/// Tenant identifiers supplied by the upstream router.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TenantQuery {
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    #[serde(rename = "userSlug")]
    pub user_slug: Option<String>,
    #[serde(rename = "blogSlug")]
    pub blog_slug: Option<String>,
}

impl TenantQuery {
    fn locator(&self) -> TenantLocator {
        TenantLocator {
            domain: self.domain.clone(),
            subdomain: self.subdomain.clone(),
            user_slug: self.user_slug.clone(),
            blog_slug: self.blog_slug.clone(),
        }
    }
}

/// Resolve the blog a request addresses.
///
/// Failure is always `BlogNotFound` (404), deliberately distinct from the
/// 401/403 family so clients can tell addressing errors from credential
/// errors.
pub async fn resolve_tenant(state: &AppState, query: &TenantQuery) -> ApiResult<BlogRow> {
    let key = query.locator().key().ok_or(ApiError::BlogNotFound)?;

    let blog = match &key {
        TenantKey::CustomDomain(domain) => {
            state.metadata.get_blog_by_custom_domain(domain).await?
        }
        TenantKey::Subdomain(subdomain) => state.metadata.get_blog_by_subdomain(subdomain).await?,
        TenantKey::Slugs {
            user_slug,
            blog_slug,
        } => {
            state
                .metadata
                .get_blog_by_slugs(user_slug.as_deref(), blog_slug)
                .await?
        }
    };

    blog.ok_or(ApiError::BlogNotFound)
}
