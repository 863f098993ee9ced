//! Image upload types: purposes, MIME allow-list, chunk session state.

use crate::hash::ContentHash;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use time::OffsetDateTime;

/// Maximum accepted length of a client-chosen upload id.
const MAX_UPLOAD_ID_LEN: usize = 128;

/// An opaque, client-chosen identifier tying chunks of one upload together.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadId(String);

impl UploadId {
    /// Parse and sanitize a client-provided upload id.
    ///
    /// Restricted to printable ASCII and bounded in length so ids are safe to
    /// use in logs and map keys.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.is_empty() {
            return Err(crate::Error::InvalidUploadId("empty".to_string()));
        }
        if s.len() > MAX_UPLOAD_ID_LEN {
            return Err(crate::Error::InvalidUploadId(format!(
                "longer than {MAX_UPLOAD_ID_LEN} chars"
            )));
        }
        if !s.chars().all(|c| c.is_ascii_graphic()) {
            return Err(crate::Error::InvalidUploadId(
                "contains non-printable characters".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UploadId({})", self.0)
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared purpose of an image upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPurpose {
    Image,
    ProfileImage,
    Icon,
}

impl UploadPurpose {
    /// Parse from the multipart `purpose` field.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "image" => Ok(Self::Image),
            "profile_image" => Ok(Self::ProfileImage),
            "icon" => Ok(Self::Icon),
            _ => Err(crate::Error::InvalidPurpose(s.to_string())),
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ProfileImage => "profile_image",
            Self::Icon => "icon",
        }
    }

    /// Check a declared MIME type against the allow-list for this purpose.
    ///
    /// Icons additionally accept the two ICO types; nothing else does.
    pub fn allows_content_type(&self, content_type: &str) -> bool {
        match content_type {
            "image/webp" | "image/jpeg" | "image/png" | "image/gif" | "image/svg+xml" => true,
            "image/x-icon" | "image/vnd.microsoft.icon" => matches!(self, Self::Icon),
            _ => false,
        }
    }
}

impl fmt::Display for UploadPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the object key for a single-shot image upload.
///
/// Deterministic per (content, filename) so that re-uploads of identical
/// bytes land on the same key and deduplicate.
pub fn image_object_key(hash: &ContentHash, filename: &str) -> String {
    format!("images/{}-{}", hash.short_hex(), sanitize_filename(filename))
}

/// Derive the object key for an assembled chunked upload.
///
/// Carries a short content hash plus a random suffix; chunked uploads come
/// from interactive clients that may re-send the same file with edits, so
/// collisions on name alone must not overwrite.
pub fn chunked_object_key(hash: &ContentHash, suffix: &str, filename: &str) -> String {
    format!(
        "images/{}-{}-{}",
        hash.short_hex(),
        suffix,
        sanitize_filename(filename)
    )
}

/// Reduce a client filename to a safe object-key component.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// In-memory state for one chunked upload.
///
/// Process-local by design: every chunk of a given upload id must reach the
/// same instance, which holds only under single-process deployments. A
/// horizontally scaled deployment needs this moved to a shared keyed store.
#[derive(Debug)]
pub struct ChunkSession {
    pub filename: String,
    pub content_type: String,
    pub total_size: u64,
    pub total_chunks: u32,
    slots: Vec<Option<Bytes>>,
    received: BTreeSet<u32>,
    pub last_activity: OffsetDateTime,
}

impl ChunkSession {
    /// Allocate a session sized for `total_chunks` slots.
    pub fn new(filename: String, content_type: String, total_size: u64, total_chunks: u32) -> Self {
        Self {
            filename,
            content_type,
            total_size,
            total_chunks,
            slots: vec![None; total_chunks as usize],
            received: BTreeSet::new(),
            last_activity: OffsetDateTime::now_utc(),
        }
    }

    /// Store a chunk at its index. Duplicate delivery of an index overwrites;
    /// legitimate retries resend identical bytes, so last-writer-wins is safe.
    pub fn store(&mut self, index: u32, data: Bytes) -> crate::Result<()> {
        if index >= self.total_chunks {
            return Err(crate::Error::InvalidChunkIndex {
                index,
                total: self.total_chunks,
            });
        }
        self.slots[index as usize] = Some(data);
        self.received.insert(index);
        self.last_activity = OffsetDateTime::now_utc();
        Ok(())
    }

    /// Number of distinct chunk indices received so far.
    pub fn received_count(&self) -> u32 {
        self.received.len() as u32
    }

    /// Complete when every index in `0..total_chunks` has arrived, in any order.
    pub fn is_complete(&self) -> bool {
        self.received.len() as u32 == self.total_chunks
    }

    /// Concatenate slots in index order. Only valid once complete.
    pub fn assemble(self) -> Bytes {
        let mut out = Vec::with_capacity(self.slots.iter().flatten().map(Bytes::len).sum());
        for slot in self.slots.into_iter().flatten() {
            out.extend_from_slice(&slot);
        }
        Bytes::from(out)
    }

    /// Whether the session has seen no activity since `cutoff`.
    pub fn idle_since(&self, cutoff: OffsetDateTime) -> bool {
        self.last_activity < cutoff
    }
}
