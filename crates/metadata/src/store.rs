//! Combined metadata store and its SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{BlogRow, GhostTokenRow, PostRow, StoredImageRow, UserRow};
use crate::repos::{BlogRepo, ImageRepo, PostRepo, TokenRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

/// Everything the gateway needs from the metadata layer, in one object-safe
/// trait so handlers can hold a single `Arc<dyn MetadataStore>`.
#[async_trait]
pub trait MetadataStore:
    BlogRepo + UserRepo + TokenRepo + ImageRepo + PostRepo + Send + Sync
{
    /// Apply schema migrations. Idempotent.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Cheap liveness probe for readiness checks.
    async fn health_check(&self) -> MetadataResult<()>;
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    slug          TEXT NOT NULL,
    profile_image TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_slug ON users (slug);

CREATE TABLE IF NOT EXISTS blogs (
    blog_id       TEXT PRIMARY KEY,
    user_id       TEXT NOT NULL REFERENCES users (user_id),
    title         TEXT NOT NULL,
    description   TEXT,
    user_slug     TEXT NOT NULL,
    blog_slug     TEXT NOT NULL,
    subdomain     TEXT,
    custom_domain TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_blogs_subdomain
    ON blogs (subdomain) WHERE subdomain IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_blogs_custom_domain
    ON blogs (custom_domain) WHERE custom_domain IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_blogs_slugs
    ON blogs (user_slug, blog_slug);

CREATE TABLE IF NOT EXISTS ghost_tokens (
    token      TEXT PRIMARY KEY,
    blog_id    TEXT NOT NULL REFERENCES blogs (blog_id),
    user_id    TEXT NOT NULL REFERENCES users (user_id),
    expires_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ghost_tokens_blog ON ghost_tokens (blog_id);

CREATE TABLE IF NOT EXISTS stored_images (
    image_id     TEXT PRIMARY KEY,
    blog_id      TEXT NOT NULL REFERENCES blogs (blog_id),
    object_key   TEXT NOT NULL,
    url          TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    content_type TEXT NOT NULL,
    size_bytes   INTEGER NOT NULL,
    chunk_count  INTEGER,
    created_at   TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_stored_images_key ON stored_images (object_key);
CREATE INDEX IF NOT EXISTS idx_stored_images_hash
    ON stored_images (blog_id, content_hash, size_bytes);

CREATE TABLE IF NOT EXISTS posts (
    post_id    TEXT PRIMARY KEY,
    blog_id    TEXT NOT NULL REFERENCES blogs (blog_id),
    title      TEXT NOT NULL,
    slug       TEXT NOT NULL,
    body       TEXT NOT NULL,
    format     TEXT NOT NULL,
    status     TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_blog ON posts (blog_id);
"#;

/// SQLite-backed store. A single writer connection with WAL keeps the
/// embedded database simple and avoids SQLITE_BUSY under concurrent writes.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path`.
    pub async fn open(path: &Path) -> MetadataResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory store for tests. The pool pins its single connection open
    /// so the database survives idle periods.
    pub async fn open_in_memory() -> MetadataResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Memory)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // The DDL is all CREATE ... IF NOT EXISTS, so no transaction needed.
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("metadata schema up to date");
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BlogRepo for SqliteStore {
    async fn create_blog(&self, blog: &BlogRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO blogs
                (blog_id, user_id, title, description, user_slug, blog_slug,
                 subdomain, custom_domain, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(blog.blog_id)
        .bind(blog.user_id)
        .bind(&blog.title)
        .bind(&blog.description)
        .bind(&blog.user_slug)
        .bind(&blog.blog_slug)
        .bind(&blog.subdomain)
        .bind(&blog.custom_domain)
        .bind(blog.created_at)
        .bind(blog.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_blog(&self, blog_id: Uuid) -> MetadataResult<Option<BlogRow>> {
        let row = sqlx::query_as::<_, BlogRow>("SELECT * FROM blogs WHERE blog_id = ?")
            .bind(blog_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_blog_by_custom_domain(&self, domain: &str) -> MetadataResult<Option<BlogRow>> {
        let row = sqlx::query_as::<_, BlogRow>("SELECT * FROM blogs WHERE custom_domain = ?")
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_blog_by_subdomain(&self, subdomain: &str) -> MetadataResult<Option<BlogRow>> {
        let row = sqlx::query_as::<_, BlogRow>("SELECT * FROM blogs WHERE subdomain = ?")
            .bind(subdomain)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_blog_by_slugs(
        &self,
        user_slug: Option<&str>,
        blog_slug: &str,
    ) -> MetadataResult<Option<BlogRow>> {
        let row = match user_slug {
            Some(user_slug) => {
                sqlx::query_as::<_, BlogRow>(
                    "SELECT * FROM blogs WHERE user_slug = ? AND blog_slug = ?",
                )
                .bind(user_slug)
                .bind(blog_slug)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                // Without a user slug the blog slug must resolve uniquely.
                let rows = sqlx::query_as::<_, BlogRow>(
                    "SELECT * FROM blogs WHERE blog_slug = ? LIMIT 2",
                )
                .bind(blog_slug)
                .fetch_all(&self.pool)
                .await?;
                if rows.len() > 1 {
                    return Err(MetadataError::Constraint(format!(
                        "blog slug '{blog_slug}' is ambiguous without a user slug"
                    )));
                }
                rows.into_iter().next()
            }
        };
        Ok(row)
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, name, email, slug, profile_image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.slug)
        .bind(&user.profile_image)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl TokenRepo for SqliteStore {
    async fn create_token(&self, token: &GhostTokenRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ghost_tokens (token, blog_id, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token.token)
        .bind(token.blog_id)
        .bind(token.user_id)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_token(&self, token: &str) -> MetadataResult<Option<GhostTokenRow>> {
        let row = sqlx::query_as::<_, GhostTokenRow>("SELECT * FROM ghost_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_token_by_key_id(&self, key_id: &str) -> MetadataResult<Option<GhostTokenRow>> {
        // key_id is validated lowercase hex upstream, so the LIKE pattern
        // cannot contain wildcards.
        let pattern = format!("{key_id}:%");
        let row = sqlx::query_as::<_, GhostTokenRow>(
            "SELECT * FROM ghost_tokens WHERE token LIKE ? LIMIT 1",
        )
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_token(&self, token: &str) -> MetadataResult<()> {
        sqlx::query("DELETE FROM ghost_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_token_by_key_id(&self, key_id: &str) -> MetadataResult<u64> {
        let pattern = format!("{key_id}:%");
        let result = sqlx::query("DELETE FROM ghost_tokens WHERE token LIKE ?")
            .bind(pattern)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ImageRepo for SqliteStore {
    async fn record_image(&self, image: &StoredImageRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stored_images
                (image_id, blog_id, object_key, url, content_hash, content_type,
                 size_bytes, chunk_count, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(image.image_id)
        .bind(image.blog_id)
        .bind(&image.object_key)
        .bind(&image.url)
        .bind(&image.content_hash)
        .bind(&image.content_type)
        .bind(image.size_bytes)
        .bind(image.chunk_count)
        .bind(image.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_image_by_hash(
        &self,
        blog_id: Uuid,
        content_hash: &str,
        size_bytes: i64,
    ) -> MetadataResult<Option<StoredImageRow>> {
        let row = sqlx::query_as::<_, StoredImageRow>(
            r#"
            SELECT * FROM stored_images
            WHERE blog_id = ? AND content_hash = ? AND size_bytes = ?
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(blog_id)
        .bind(content_hash)
        .bind(size_bytes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_image_by_key(&self, object_key: &str) -> MetadataResult<Option<StoredImageRow>> {
        let row =
            sqlx::query_as::<_, StoredImageRow>("SELECT * FROM stored_images WHERE object_key = ?")
                .bind(object_key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }
}

#[async_trait]
impl PostRepo for SqliteStore {
    async fn create_post(&self, post: &PostRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts
                (post_id, blog_id, title, slug, body, format, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.post_id)
        .bind(post.blog_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.body)
        .bind(&post.format)
        .bind(&post.status)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_post(&self, post: &PostRow) -> MetadataResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, slug = ?, body = ?, format = ?, status = ?, updated_at = ?
            WHERE post_id = ? AND blog_id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.body)
        .bind(&post.format)
        .bind(&post.status)
        .bind(post.updated_at)
        .bind(post.post_id)
        .bind(post.blog_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("post {}", post.post_id)));
        }
        Ok(())
    }

    async fn get_post(&self, post_id: Uuid) -> MetadataResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE post_id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
