//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Blog record: one addressable publishing target.
///
/// `subdomain` and `custom_domain` are each globally unique when non-null;
/// the `(user_slug, blog_slug)` pair is unique. Blogs are created by the
/// external CRUD layer and read-only to the gateway.
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    pub blog_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub user_slug: String,
    pub blog_slug: String,
    pub subdomain: Option<String>,
    pub custom_domain: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User record, read by the response shaper for `/users/me/`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub slug: String,
    pub profile_image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Issued Admin API credential, stored as a single `"id:secret"` string.
///
/// `expires_at = NULL` means the key never expires on its own (dashboard
/// keys). Time-boxed tokens carry an expiry and are lazily deleted the
/// first time they are seen expired.
#[derive(Debug, Clone, FromRow)]
pub struct GhostTokenRow {
    pub token: String,
    pub blog_id: Uuid,
    pub user_id: Uuid,
    pub expires_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl GhostTokenRow {
    /// The key-id half of the stored token (substring before the first colon).
    pub fn key_id(&self) -> &str {
        self.token.split(':').next().unwrap_or("")
    }

    /// The secret half of the stored token.
    pub fn secret(&self) -> &str {
        self.token.split_once(':').map(|(_, s)| s).unwrap_or("")
    }

    /// Check whether the credential has expired.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }
}

/// Content-addressed record of an uploaded image.
#[derive(Debug, Clone, FromRow)]
pub struct StoredImageRow {
    pub image_id: Uuid,
    pub blog_id: Uuid,
    pub object_key: String,
    pub url: String,
    pub content_hash: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Number of chunks the upload arrived in; NULL for single-shot uploads.
    pub chunk_count: Option<i64>,
    pub created_at: OffsetDateTime,
}

/// Minimal post record for the gateway's write path.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub post_id: Uuid,
    pub blog_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    /// Canonical stored format, "MARKDOWN" or "HTML".
    pub format: String,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
