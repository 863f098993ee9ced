//! Site, config, and health handlers.
//!
//! Clients sniff these payloads for capabilities before deciding which
//! editor features to enable, so the field set is part of the compatibility
//! contract: `version`, `labs.lexicalEditor`, `allow_external_signup`,
//! `imageOptimization`.

use crate::auth::verify_ghost_auth;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::tenant::{resolve_tenant, TenantQuery};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use lantern_core::GHOST_VERSION;
use lantern_metadata::models::BlogRow;
use serde_json::{json, Value};

/// Public URL a blog is reachable under.
pub(crate) fn blog_url(state: &AppState, blog: &BlogRow) -> String {
    if let Some(domain) = blog.custom_domain.as_deref().filter(|d| !d.is_empty()) {
        return format!("https://{domain}");
    }
    format!(
        "{}/{}/{}",
        state.config.server.public_url.trim_end_matches('/'),
        blog.user_slug,
        blog.blog_slug
    )
}

/// `GET /site/`: site info, no auth required.
pub async fn get_site(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query).await?;

    Ok(Json(json!({
        "site": {
            "title": blog.title,
            "description": blog.description.clone().unwrap_or_default(),
            "url": blog_url(&state, &blog),
            "version": GHOST_VERSION,
            "allow_external_signup": false,
        }
    })))
}

/// `GET /config/`: server capability document, auth required.
pub async fn get_config(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query).await?;
    verify_ghost_auth(&state, &headers, &blog).await?;

    Ok(Json(json!({
        "config": {
            "version": GHOST_VERSION,
            "environment": "production",
            "database": "sqlite3",
            "labs": {
                // Markdown clients break against the lexical editor payload
                // shape, so it stays off.
                "lexicalEditor": false,
            },
            "imageOptimization": {
                "resize": false,
            },
        }
    })))
}

/// `GET /health/`: unauthenticated liveness probe.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.metadata.health_check().await?;
    state.storage.health_check().await?;
    Ok(Json(json!({ "status": "ok" })))
}
