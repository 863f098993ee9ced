//! Current-user handlers.

use crate::auth::verify_ghost_auth;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tenant::{resolve_tenant, TenantQuery};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

/// `GET /users/me/`: the user the verified credential is bound to, in Ghost's
/// collection shape.
pub async fn get_current_user(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query).await?;
    let principal = verify_ghost_auth(&state, &headers, &blog).await?;

    let user = state
        .metadata
        .get_user(principal.user_id)
        .await?
        .ok_or_else(|| ApiError::Internal("credential references a missing user".to_string()))?;

    Ok(Json(json!({
        "users": [{
            "id": user.user_id,
            "name": user.name,
            "email": user.email,
            "slug": user.slug,
            "profile_image": user.profile_image,
            "roles": [{ "name": "Owner" }],
        }]
    })))
}

/// `GET /users/me/token/`: credential introspection for clients that probe
/// token validity before writing.
pub async fn validate_token(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query).await?;
    let principal = verify_ghost_auth(&state, &headers, &blog).await?;

    Ok(Json(json!({
        "valid": true,
        "user_id": principal.user_id,
        "blog_id": principal.blog_id,
    })))
}
