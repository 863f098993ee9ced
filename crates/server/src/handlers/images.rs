//! Image upload handlers: single-shot and chunked.

use crate::auth::verify_ghost_auth;
use crate::chunks::ChunkOutcome;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::tenant::{resolve_tenant, TenantQuery};
use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use lantern_core::hash::ContentHash;
use lantern_core::upload::{chunked_object_key, image_object_key, UploadPurpose};
use lantern_core::UploadId;
use lantern_metadata::models::{BlogRow, StoredImageRow};
use lantern_metadata::MetadataError;
use rand::RngCore;
use serde_json::{json, Value};
use time::OffsetDateTime;
use uuid::Uuid;

fn multipart_err(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("malformed multipart body: {e}"))
}

fn ghost_image_doc(url: String, image_ref: Option<String>) -> Value {
    json!({
        "images": [{
            "url": url,
            "ref": image_ref,
        }]
    })
}

/// Validate, deduplicate, store, and record one image; returns the public URL.
///
/// Shared by both upload paths. Deduplication is by content hash and size:
/// a byte-identical re-upload reuses the stored object and its URL.
async fn store_image(
    state: &AppState,
    blog: &BlogRow,
    purpose: UploadPurpose,
    filename: &str,
    content_type: &str,
    data: Bytes,
    chunk_count: Option<i64>,
) -> ApiResult<String> {
    if !purpose.allows_content_type(content_type) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "{content_type} is not an accepted image type for purpose '{purpose}'"
        )));
    }

    let limit = state.config.server.max_upload_bytes;
    if data.len() as u64 > limit {
        return Err(ApiError::payload_too_large(data.len() as u64, limit));
    }

    let hash = ContentHash::compute(&data);
    if let Some(existing) = state
        .metadata
        .find_image_by_hash(blog.blog_id, &hash.to_hex(), data.len() as i64)
        .await?
    {
        tracing::debug!(hash = %hash, url = %existing.url, "deduplicated image upload");
        return Ok(existing.url);
    }

    let object_key = match chunk_count {
        // Chunked uploads come from interactive clients that may re-send the
        // same name with different bytes; the random suffix keeps them apart.
        Some(_) => {
            let mut suffix = [0u8; 4];
            rand::rngs::OsRng.fill_bytes(&mut suffix);
            chunked_object_key(&hash, &hex::encode(suffix), filename)
        }
        None => image_object_key(&hash, filename),
    };

    state
        .storage
        .put_if_not_exists(&object_key, data.clone())
        .await?;

    let url = state.content_url(&object_key);
    let row = StoredImageRow {
        image_id: Uuid::new_v4(),
        blog_id: blog.blog_id,
        object_key: object_key.clone(),
        url: url.clone(),
        content_hash: hash.to_hex(),
        content_type: content_type.to_string(),
        size_bytes: data.len() as i64,
        chunk_count,
        created_at: OffsetDateTime::now_utc(),
    };

    match state.metadata.record_image(&row).await {
        Ok(()) => {}
        // Lost a race on the same object key; the winner's row is the record.
        Err(MetadataError::Constraint(_)) => {
            if let Some(existing) = state.metadata.get_image_by_key(&object_key).await? {
                return Ok(existing.url);
            }
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        blog_id = %blog.blog_id,
        key = %object_key,
        bytes = row.size_bytes,
        chunks = ?chunk_count,
        "stored image"
    );

    Ok(url)
}

/// `POST /images/upload/`: whole file in one multipart request.
pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query).await?;
    verify_ghost_auth(&state, &headers, &blog).await?;

    let mut file: Option<(String, String, Bytes)> = None;
    let mut purpose = UploadPurpose::Image;
    let mut image_ref: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_err)?;
                file = Some((filename, content_type, data));
            }
            Some("purpose") => {
                let value = field.text().await.map_err(multipart_err)?;
                purpose = UploadPurpose::parse(&value)?;
            }
            Some("ref") => {
                image_ref = Some(field.text().await.map_err(multipart_err)?);
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| ApiError::BadRequest("missing 'file' field".to_string()))?;

    let url = store_image(&state, &blog, purpose, &filename, &content_type, data, None).await?;

    Ok(Json(ghost_image_doc(url, image_ref)))
}

/// `POST /images/upload-chunk/`: one numbered piece of a larger file.
///
/// Responds with a progress document until the last outstanding index
/// arrives, then behaves exactly like the single-shot upload. A failed chunk
/// invalidates nothing already received.
pub async fn upload_image_chunk(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let blog = resolve_tenant(&state, &query).await?;
    verify_ghost_auth(&state, &headers, &blog).await?;

    let mut upload_id: Option<UploadId> = None;
    let mut chunk_index: Option<u32> = None;
    let mut total_chunks: Option<u32> = None;
    let mut total_size: Option<u64> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut chunk: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        match field.name() {
            Some("uploadId") => {
                let value = field.text().await.map_err(multipart_err)?;
                upload_id = Some(UploadId::parse(&value)?);
            }
            Some("chunkIndex") => {
                chunk_index = Some(parse_number(field, "chunkIndex").await?);
            }
            Some("totalChunks") => {
                total_chunks = Some(parse_number(field, "totalChunks").await?);
            }
            Some("totalSize") => {
                total_size = Some(parse_number(field, "totalSize").await?);
            }
            Some("filename") => {
                filename = Some(field.text().await.map_err(multipart_err)?);
            }
            Some("contentType") => {
                content_type = Some(field.text().await.map_err(multipart_err)?);
            }
            Some("chunk") => {
                chunk = Some(field.bytes().await.map_err(multipart_err)?);
            }
            _ => {}
        }
    }

    let upload_id = require(upload_id, "uploadId")?;
    let chunk_index = require(chunk_index, "chunkIndex")?;
    let total_chunks = require(total_chunks, "totalChunks")?;
    let total_size = require(total_size, "totalSize")?;
    let filename = require(filename, "filename")?;
    let content_type = require(content_type, "contentType")?;
    let chunk = require(chunk, "chunk")?;

    let outcome = state
        .chunks
        .receive(
            &upload_id,
            chunk_index,
            total_chunks,
            &filename,
            &content_type,
            total_size,
            chunk,
        )
        .await?;

    match outcome {
        ChunkOutcome::Partial { received, total } => Ok(Json(json!({
            "message": "Chunk received",
            "complete": false,
            "received": received,
            "total": total,
        }))),
        ChunkOutcome::Complete(upload) => {
            let url = store_image(
                &state,
                &blog,
                UploadPurpose::Image,
                &upload.filename,
                &upload.content_type,
                upload.data,
                Some(i64::from(upload.total_chunks)),
            )
            .await?;
            Ok(Json(ghost_image_doc(url, None)))
        }
    }
}

fn require<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::BadRequest(format!("missing '{field}' field")))
}

async fn parse_number<T: std::str::FromStr>(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> ApiResult<T> {
    let value = field.text().await.map_err(multipart_err)?;
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("'{name}' is not a valid number")))
}
