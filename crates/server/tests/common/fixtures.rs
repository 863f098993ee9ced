//! Seed data and request builders shared by the integration tests.

use axum::body::Body;
use axum::http::{header, Method, Request};
use jsonwebtoken::{EncodingKey, Header};
use lantern_core::apikey::{AdminApiKey, SecretEncoding};
use lantern_metadata::models::{BlogRow, GhostTokenRow, UserRow};
use lantern_metadata::MetadataStore;
use serde_json::json;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

/// The plaintext operator token matching `AdminConfig::for_testing`.
#[allow(dead_code)]
pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";

/// Insert a user and a blog owned by them.
#[allow(dead_code)]
pub async fn seed_blog(
    metadata: &Arc<dyn MetadataStore>,
    user_slug: &str,
    blog_slug: &str,
    subdomain: Option<&str>,
    custom_domain: Option<&str>,
) -> (BlogRow, UserRow) {
    let now = OffsetDateTime::now_utc();
    let user = UserRow {
        user_id: Uuid::new_v4(),
        name: format!("{user_slug} author"),
        email: format!("{user_slug}@example.com"),
        slug: user_slug.to_string(),
        profile_image: None,
        created_at: now,
        updated_at: now,
    };
    metadata.create_user(&user).await.expect("seed user");

    let blog = BlogRow {
        blog_id: Uuid::new_v4(),
        user_id: user.user_id,
        title: format!("{blog_slug} blog"),
        description: Some("Notes from the engine room".to_string()),
        user_slug: user_slug.to_string(),
        blog_slug: blog_slug.to_string(),
        subdomain: subdomain.map(str::to_string),
        custom_domain: custom_domain.map(str::to_string),
        created_at: now,
        updated_at: now,
    };
    metadata.create_blog(&blog).await.expect("seed blog");

    (blog, user)
}

/// Mint a key pair for the blog and store the credential row.
#[allow(dead_code)]
pub async fn issue_key(
    metadata: &Arc<dyn MetadataStore>,
    blog: &BlogRow,
    expires_at: Option<OffsetDateTime>,
) -> AdminApiKey {
    let key = AdminApiKey::generate();
    let row = GhostTokenRow {
        token: key.to_token_string(),
        blog_id: blog.blog_id,
        user_id: blog.user_id,
        expires_at,
        created_at: OffsetDateTime::now_utc(),
    };
    metadata.create_token(&row).await.expect("seed token");
    key
}

/// Sign a short-lived HS256 JWT the way a Ghost client would, with the key
/// id in the `kid` header and the secret interpreted under `encoding`.
#[allow(dead_code)]
pub fn sign_ghost_jwt(key: &AdminApiKey, encoding: SecretEncoding, ttl_secs: i64) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = json!({
        "iat": now - 10,
        "exp": now + ttl_secs,
        "aud": "/admin/",
    });
    let mut header = Header::new(jsonwebtoken::Algorithm::HS256);
    header.kid = Some(key.key_id.as_str().to_string());
    let key_bytes = encoding
        .key_bytes(&key.secret)
        .expect("secret decodes under candidate encoding");
    jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(&key_bytes))
        .expect("JWT signing")
}

/// A GET request with no Authorization header.
#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// A GET request with `Authorization: Ghost <token>`.
#[allow(dead_code)]
pub fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Ghost {token}"))
        .body(Body::empty())
        .expect("request")
}

/// A JSON request with `Authorization: Ghost <token>`.
#[allow(dead_code)]
pub fn json_authed(
    method: Method,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Ghost {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("request")
}

/// A JSON request with `Authorization: Bearer <token>` (operator surface).
#[allow(dead_code)]
pub fn json_bearer(
    method: Method,
    uri: &str,
    token: &str,
    body: &serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize")))
        .expect("request")
}

/// Minimal multipart/form-data body builder for the upload endpoints.
#[allow(dead_code)]
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: format!("lantern-test-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body
            .extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Build a POST request carrying the accumulated parts.
    pub fn into_request(mut self, uri: &str, token: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Ghost {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .expect("request")
    }
}
