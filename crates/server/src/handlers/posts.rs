//! Post write path.
//!
//! Publishing clients create and update posts through the gateway; this is
//! the surface the content negotiator feeds. Reads, listings, and the rest
//! of post CRUD live in the dashboard layer.

use crate::auth::verify_ghost_auth;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tenant::{resolve_tenant, TenantQuery};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use lantern_core::content::{negotiate, ContentFormat, ContentPayload, ContentSource};
use lantern_metadata::models::PostRow;
use serde::Deserialize;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

/// Query parameters for post writes: tenant locators plus the `source`
/// override. Kept flat because the query extractor does not flatten.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PostQuery {
    pub domain: Option<String>,
    pub subdomain: Option<String>,
    #[serde(rename = "userSlug")]
    pub user_slug: Option<String>,
    #[serde(rename = "blogSlug")]
    pub blog_slug: Option<String>,
    pub source: Option<String>,
}

impl PostQuery {
    fn tenant(&self) -> TenantQuery {
        TenantQuery {
            domain: self.domain.clone(),
            subdomain: self.subdomain.clone(),
            user_slug: self.user_slug.clone(),
            blog_slug: self.blog_slug.clone(),
        }
    }

    fn content_source(&self) -> ContentSource {
        ContentSource::from_query(self.source.as_deref())
    }
}

/// Ghost wraps single resources in a one-element collection.
#[derive(Debug, Deserialize)]
pub struct PostsDocument {
    pub posts: Vec<PostInput>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub lexical: Option<String>,
    pub mobiledoc: Option<String>,
}

impl PostInput {
    fn content(&self) -> ContentPayload {
        ContentPayload {
            markdown: self.markdown.clone(),
            html: self.html.clone(),
            lexical: self.lexical.clone(),
            mobiledoc: self.mobiledoc.clone(),
        }
    }

    fn has_content(&self) -> bool {
        [&self.markdown, &self.html, &self.lexical, &self.mobiledoc]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

fn single_post(document: PostsDocument) -> ApiResult<PostInput> {
    let mut posts = document.posts;
    if posts.len() != 1 {
        return Err(ApiError::BadRequest(
            "request must carry exactly one post".to_string(),
        ));
    }
    Ok(posts.remove(0))
}

fn validate_status(status: Option<String>) -> ApiResult<Option<String>> {
    match status.as_deref() {
        None | Some("draft") | Some("published") => Ok(status),
        Some(other) => Err(ApiError::BadRequest(format!("unknown status '{other}'"))),
    }
}

fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    let mut out = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    if out.is_empty() {
        "untitled".to_string()
    } else {
        out
    }
}

fn render_post(blog_url: &str, post: &PostRow) -> ApiResult<Value> {
    let format = ContentFormat::parse(&post.format)?;
    let (html, markdown) = match format {
        ContentFormat::Html => (Some(post.body.as_str()), None),
        ContentFormat::Markdown => (None, Some(post.body.as_str())),
    };
    let created_at = post
        .created_at
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("timestamp formatting: {e}")))?;
    let updated_at = post
        .updated_at
        .format(&Rfc3339)
        .map_err(|e| ApiError::Internal(format!("timestamp formatting: {e}")))?;

    Ok(json!({
        "posts": [{
            "id": post.post_id,
            "uuid": post.post_id,
            "title": post.title,
            "slug": post.slug,
            "status": post.status,
            "html": html,
            "markdown": markdown,
            "url": format!("{}/{}", blog_url.trim_end_matches('/'), post.slug),
            "created_at": created_at,
            "updated_at": updated_at,
        }]
    }))
}

/// `POST /posts/`: create a post from a Ghost-shaped document.
pub async fn create_post(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
    headers: HeaderMap,
    Json(document): Json<PostsDocument>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let blog = resolve_tenant(&state, &query.tenant()).await?;
    verify_ghost_auth(&state, &headers, &blog).await?;

    let input = single_post(document)?;
    let status = validate_status(input.status.clone())?.unwrap_or_else(|| "draft".to_string());
    let title = input.title.clone().unwrap_or_else(|| "(Untitled)".to_string());
    let slug = input.slug.clone().unwrap_or_else(|| slugify(&title));
    let content = negotiate(&input.content(), query.content_source());

    let now = OffsetDateTime::now_utc();
    let post = PostRow {
        post_id: Uuid::new_v4(),
        blog_id: blog.blog_id,
        title,
        slug,
        body: content.body,
        format: content.format.as_str().to_string(),
        status,
        created_at: now,
        updated_at: now,
    };
    state.metadata.create_post(&post).await?;

    tracing::info!(blog_id = %blog.blog_id, post_id = %post.post_id, "created post");

    let body = render_post(&super::site::blog_url(&state, &blog), &post)?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// `PUT /posts/{post_id}/`: update a post's title, content, or status.
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(query): Query<PostQuery>,
    headers: HeaderMap,
    Json(document): Json<PostsDocument>,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query.tenant()).await?;
    verify_ghost_auth(&state, &headers, &blog).await?;

    let existing = state
        .metadata
        .get_post(post_id)
        .await?
        .filter(|post| post.blog_id == blog.blog_id)
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    let input = single_post(document)?;
    let status = validate_status(input.status.clone())?;

    let (body, format) = if input.has_content() {
        let content = negotiate(&input.content(), query.content_source());
        (content.body, content.format.as_str().to_string())
    } else {
        (existing.body.clone(), existing.format.clone())
    };

    let post = PostRow {
        title: input.title.unwrap_or(existing.title),
        slug: input.slug.unwrap_or(existing.slug),
        body,
        format,
        status: status.unwrap_or(existing.status),
        updated_at: OffsetDateTime::now_utc(),
        ..existing
    };
    state.metadata.update_post(&post).await?;

    tracing::info!(blog_id = %blog.blog_id, post_id = %post.post_id, "updated post");

    let body = render_post(&super::site::blog_url(&state, &blog), &post)?;
    Ok(Json(body))
}
