//! Ghost token verification and operator admin auth.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use lantern_core::apikey::{is_raw_key_token, ApiSecret, KeyId, Principal, SecretEncoding};
use lantern_metadata::models::{BlogRow, GhostTokenRow};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Claims we read out of a client JWT. `aud` is not validated, matching the
/// clients that send any of the versioned admin namespaces; only `exp` is
/// enforced.
#[derive(Debug, Deserialize)]
struct GhostClaims {
    #[allow(dead_code)]
    exp: u64,
}

/// Verify the `Authorization: Ghost <token>` header against the resolved blog.
///
/// The token is either a raw `id:secret` key pair or an HS256 JWT whose `kid`
/// names the key pair that signed it. Expired credentials are deleted as they
/// are discovered; that deletion is the only mutation on this path. The raw
/// token is never logged in full.
pub async fn verify_ghost_auth(
    state: &AppState,
    headers: &HeaderMap,
    blog: &BlogRow,
) -> ApiResult<Principal> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingAuth)?;
    let token = header.strip_prefix("Ghost ").ok_or(ApiError::MissingAuth)?.trim();

    let row = if is_raw_key_token(token) {
        lookup_raw_token(state, token).await?
    } else {
        lookup_and_verify_jwt(state, token).await?
    };

    let key_id =
        KeyId::parse(row.key_id()).map_err(|e| ApiError::Internal(format!("stored key id: {e}")))?;

    if row.blog_id != blog.blog_id {
        tracing::warn!(key_id = %key_id, blog_id = %blog.blog_id, "token bound to a different blog");
        return Err(ApiError::ForbiddenForBlog);
    }

    Ok(Principal {
        blog_id: row.blog_id,
        user_id: row.user_id,
        key_id,
    })
}

/// Legacy path: the header carries the `id:secret` pair itself.
async fn lookup_raw_token(state: &AppState, token: &str) -> ApiResult<GhostTokenRow> {
    let row = state
        .metadata
        .get_token(token)
        .await?
        .ok_or(ApiError::InvalidToken)?;
    purge_if_expired(state, row).await
}

/// Standard path: HS256 JWT with the key id in the `kid` header.
async fn lookup_and_verify_jwt(state: &AppState, token: &str) -> ApiResult<GhostTokenRow> {
    let header = jsonwebtoken::decode_header(token).map_err(|_| ApiError::InvalidToken)?;
    let kid = header.kid.ok_or(ApiError::InvalidToken)?;
    let key_id = KeyId::parse(&kid).map_err(|_| ApiError::InvalidToken)?;

    let row = state
        .metadata
        .find_token_by_key_id(key_id.as_str())
        .await?
        .ok_or(ApiError::InvalidToken)?;
    let row = purge_if_expired(state, row).await?;

    let secret = ApiSecret::parse(row.secret())
        .map_err(|e| ApiError::Internal(format!("stored secret: {e}")))?;

    // Clients disagree on how the hex secret becomes signing-key bytes; try
    // the closed candidate list in order, first success wins.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let mut saw_expired = false;
    for encoding in SecretEncoding::CANDIDATES {
        let Some(key_bytes) = encoding.key_bytes(&secret) else {
            continue;
        };
        let key = DecodingKey::from_secret(&key_bytes);
        match jsonwebtoken::decode::<GhostClaims>(token, &key, &validation) {
            Ok(_) => {
                tracing::debug!(key_id = %key_id, encoding = ?encoding, "verified Ghost JWT");
                return Ok(row);
            }
            Err(e)
                if matches!(
                    e.kind(),
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature
                ) =>
            {
                saw_expired = true;
            }
            Err(_) => {}
        }
    }

    if saw_expired {
        Err(ApiError::TokenExpired)
    } else {
        Err(ApiError::InvalidToken)
    }
}

/// Lazy expiry cleanup: delete an expired credential the first time it is
/// seen, then fail with `TokenExpired`.
async fn purge_if_expired(state: &AppState, row: GhostTokenRow) -> ApiResult<GhostTokenRow> {
    if row.is_expired(OffsetDateTime::now_utc()) {
        state.metadata.delete_token(&row.token).await?;
        tracing::info!(key_id = %row.key_id(), "purged expired credential");
        return Err(ApiError::TokenExpired);
    }
    Ok(row)
}

/// Check the operator admin token guarding key issuance and revocation.
///
/// Dashboard auth is external to the gateway; the dashboard proves itself
/// with a bearer token whose SHA-256 hash is in config.
pub fn verify_admin_token(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingAuth)?;
    let token = header.strip_prefix("Bearer ").ok_or(ApiError::MissingAuth)?.trim();

    let hash = hex::encode(Sha256::digest(token.as_bytes()));
    if hash != state.config.admin.token_hash {
        return Err(ApiError::InvalidToken);
    }
    Ok(())
}
