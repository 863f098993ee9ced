//! In-flight chunked upload sessions.

use crate::error::{ApiError, ApiResult};
use bytes::Bytes;
use lantern_core::upload::ChunkSession;
use lantern_core::UploadId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Upper bound on chunks per upload. With the request-body ceiling this also
/// bounds per-session memory.
const MAX_TOTAL_CHUNKS: u32 = 512;

/// Outcome of receiving one chunk.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// More chunks outstanding.
    Partial { received: u32, total: u32 },
    /// Every index arrived; the session was claimed and assembled.
    Complete(AssembledUpload),
}

/// The fully reassembled file, ready for the single-shot storage pipeline.
#[derive(Debug)]
pub struct AssembledUpload {
    pub filename: String,
    pub content_type: String,
    pub total_chunks: u32,
    pub data: Bytes,
}

/// Process-local map of chunked upload sessions.
///
/// Every chunk of a given upload id must reach the same instance; this holds
/// only for single-process deployments. Horizontal scaling needs the session
/// state moved to a shared keyed store.
#[derive(Clone, Default)]
pub struct ChunkSessionMap {
    sessions: Arc<Mutex<HashMap<String, ChunkSession>>>,
}

impl ChunkSessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one chunk, completing the upload if it was the last outstanding
    /// index.
    ///
    /// The session is created on first sight of the upload id. Completion
    /// claims and removes the session under the map lock, so assembly runs
    /// exactly once even when the final chunks land concurrently.
    #[allow(clippy::too_many_arguments)]
    pub async fn receive(
        &self,
        upload_id: &UploadId,
        chunk_index: u32,
        total_chunks: u32,
        filename: &str,
        content_type: &str,
        total_size: u64,
        data: Bytes,
    ) -> ApiResult<ChunkOutcome> {
        if total_chunks == 0 || total_chunks > MAX_TOTAL_CHUNKS {
            return Err(ApiError::BadRequest(format!(
                "totalChunks must be between 1 and {MAX_TOTAL_CHUNKS}"
            )));
        }

        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(upload_id.as_str().to_string()).or_insert_with(|| {
            ChunkSession::new(
                filename.to_string(),
                content_type.to_string(),
                total_size,
                total_chunks,
            )
        });

        if session.total_chunks != total_chunks {
            return Err(ApiError::BadRequest(format!(
                "totalChunks changed mid-upload: session has {}, request says {}",
                session.total_chunks, total_chunks
            )));
        }

        session.store(chunk_index, data)?;

        if !session.is_complete() {
            return Ok(ChunkOutcome::Partial {
                received: session.received_count(),
                total: session.total_chunks,
            });
        }

        // Claim atomically: the entry is gone before the lock drops, so a
        // concurrent duplicate of the final chunk starts a fresh session
        // instead of assembling twice.
        let session = sessions
            .remove(upload_id.as_str())
            .ok_or_else(|| ApiError::Internal("chunk session vanished".to_string()))?;
        drop(sessions);

        let total_chunks = session.total_chunks;
        let filename = session.filename.clone();
        let content_type = session.content_type.clone();
        let data = session.assemble();

        tracing::debug!(
            upload_id = %upload_id,
            chunks = total_chunks,
            bytes = data.len(),
            "chunked upload assembled"
        );

        Ok(ChunkOutcome::Complete(AssembledUpload {
            filename,
            content_type,
            total_chunks,
            data,
        }))
    }

    /// Drop sessions idle since before the cutoff. Returns how many were
    /// evicted.
    pub async fn evict_idle(&self, idle_timeout: time::Duration) -> usize {
        let cutoff = time::OffsetDateTime::now_utc() - idle_timeout;
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.idle_since(cutoff));
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

/// Spawn the background sweeper that evicts abandoned sessions.
pub fn spawn_sweeper(
    chunks: ChunkSessionMap,
    idle_timeout: time::Duration,
    sweep_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval.max(Duration::from_secs(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let evicted = chunks.evict_idle(idle_timeout).await;
            if evicted > 0 {
                tracing::info!(evicted, "evicted abandoned chunk upload sessions");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload_id(s: &str) -> UploadId {
        UploadId::parse(s).unwrap()
    }

    async fn send(
        map: &ChunkSessionMap,
        id: &UploadId,
        index: u32,
        total: u32,
        data: &'static [u8],
    ) -> ChunkOutcome {
        map.receive(
            id,
            index,
            total,
            "big.png",
            "image/png",
            6,
            Bytes::from_static(data),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn out_of_order_chunks_assemble_in_index_order() {
        let map = ChunkSessionMap::new();
        let id = upload_id("u1");

        assert!(matches!(
            send(&map, &id, 2, 3, b"ef").await,
            ChunkOutcome::Partial {
                received: 1,
                total: 3
            }
        ));
        assert!(matches!(
            send(&map, &id, 0, 3, b"ab").await,
            ChunkOutcome::Partial {
                received: 2,
                total: 3
            }
        ));
        match send(&map, &id, 1, 3, b"cd").await {
            ChunkOutcome::Complete(upload) => {
                assert_eq!(upload.data, Bytes::from_static(b"abcdef"));
                assert_eq!(upload.total_chunks, 3);
                assert_eq!(upload.filename, "big.png");
            }
            ChunkOutcome::Partial { .. } => panic!("expected completion"),
        }
        assert!(map.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_index_does_not_advance_completion() {
        let map = ChunkSessionMap::new();
        let id = upload_id("u2");

        send(&map, &id, 0, 2, b"ab").await;
        match send(&map, &id, 0, 2, b"ab").await {
            ChunkOutcome::Partial { received, total } => {
                assert_eq!(received, 1);
                assert_eq!(total, 2);
            }
            ChunkOutcome::Complete(_) => panic!("duplicate must not complete"),
        }
    }

    #[tokio::test]
    async fn completion_claims_session_exactly_once() {
        let map = ChunkSessionMap::new();
        let id = upload_id("u3");

        send(&map, &id, 0, 2, b"ab").await;
        let first = send(&map, &id, 1, 2, b"cd").await;
        assert!(matches!(first, ChunkOutcome::Complete(_)));

        // A retry of the final chunk after completion starts a new session.
        let retry = send(&map, &id, 1, 2, b"cd").await;
        assert!(matches!(
            retry,
            ChunkOutcome::Partial {
                received: 1,
                total: 2
            }
        ));
    }

    #[tokio::test]
    async fn mismatched_total_chunks_rejected() {
        let map = ChunkSessionMap::new();
        let id = upload_id("u4");
        send(&map, &id, 0, 3, b"ab").await;
        let err = map
            .receive(&id, 1, 4, "big.png", "image/png", 6, Bytes::from_static(b"cd"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let map = ChunkSessionMap::new();
        let id = upload_id("u5");
        send(&map, &id, 0, 2, b"ab").await;

        assert_eq!(map.evict_idle(time::Duration::hours(1)).await, 0);
        assert_eq!(map.len().await, 1);

        assert_eq!(map.evict_idle(time::Duration::seconds(-1)).await, 1);
        assert!(map.is_empty().await);
    }
}
