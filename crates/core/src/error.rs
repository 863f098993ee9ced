//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid upload id: {0}")]
    InvalidUploadId(String),

    #[error("invalid upload purpose: {0}")]
    InvalidPurpose(String),

    #[error("invalid chunk index: {index} (total chunks: {total})")]
    InvalidChunkIndex { index: u32, total: u32 },

    #[error("invalid hash: {0}")]
    InvalidHash(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
