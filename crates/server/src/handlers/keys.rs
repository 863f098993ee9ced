//! Admin API key issuance and revocation.
//!
//! Guarded by the operator admin token, not by Ghost auth: the dashboard
//! calls these on behalf of a user, and dashboard authentication is external
//! to the gateway.

use crate::auth::verify_admin_token;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lantern_core::apikey::{AdminApiKey, KeyId};
use lantern_metadata::models::GhostTokenRow;
use serde::Deserialize;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct IssueKeyRequest {
    pub blog_id: Uuid,
    pub user_id: Uuid,
    /// Override for the configured default TTL. Zero means no expiry
    /// (dashboard keys).
    pub ttl_secs: Option<u64>,
}

/// `POST /keys/`: mint a fresh Admin API key pair.
///
/// The plaintext secret is returned exactly once; only the `id:secret`
/// string is stored and it is never logged.
pub async fn issue_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IssueKeyRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    verify_admin_token(&state, &headers)?;

    let blog = state
        .metadata
        .get_blog(request.blog_id)
        .await?
        .ok_or(ApiError::BlogNotFound)?;
    state
        .metadata
        .get_user(request.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    let ttl_secs = request.ttl_secs.unwrap_or(state.config.server.key_ttl_secs);
    let now = OffsetDateTime::now_utc();
    let expires_at = match ttl_secs {
        0 => None,
        secs => {
            let secs = i64::try_from(secs)
                .map_err(|_| ApiError::BadRequest("ttl_secs out of range".to_string()))?;
            Some(now + Duration::seconds(secs))
        }
    };

    let key = AdminApiKey::generate();
    let row = GhostTokenRow {
        token: key.to_token_string(),
        blog_id: blog.blog_id,
        user_id: request.user_id,
        expires_at,
        created_at: now,
    };
    state.metadata.create_token(&row).await?;

    tracing::info!(
        blog_id = %blog.blog_id,
        key_id = %key.key_id,
        expires_at = ?expires_at,
        "issued Admin API key"
    );

    let expires_at = expires_at
        .map(|t| t.format(&Rfc3339))
        .transpose()
        .map_err(|e| ApiError::Internal(format!("timestamp formatting: {e}")))?;
    let created_at = now
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("timestamp formatting: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "keys": [{
                "id": key.key_id.as_str(),
                "secret": key.to_token_string(),
                "blog_id": blog.blog_id,
                "user_id": request.user_id,
                "created_at": created_at,
                "expires_at": expires_at,
            }]
        })),
    ))
}

/// `DELETE /keys/{key_id}/`: revoke a key pair. Idempotent; revoking an
/// unknown key id succeeds so retries are safe.
pub async fn revoke_key(
    State(state): State<AppState>,
    Path(key_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    verify_admin_token(&state, &headers)?;

    let key_id = KeyId::parse(&key_id)?;
    let removed = state.metadata.delete_token_by_key_id(key_id.as_str()).await?;

    tracing::info!(key_id = %key_id, removed, "revoked Admin API key");

    Ok(StatusCode::NO_CONTENT)
}
