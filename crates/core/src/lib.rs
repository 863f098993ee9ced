//! Core domain types and shared logic for the Lantern publishing gateway.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Admin API key material and secret-encoding candidates
//! - Tenant locators and authenticated principals
//! - Content negotiation across the four client payload encodings
//! - Chunked upload session state
//! - Content hashing for image deduplication

pub mod apikey;
pub mod config;
pub mod content;
pub mod error;
pub mod hash;
pub mod tenant;
pub mod upload;

pub use apikey::{AdminApiKey, ApiSecret, KeyId, Principal, SecretEncoding};
pub use content::{ContentFormat, ContentPayload, ContentSource, NegotiatedContent};
pub use error::{Error, Result};
pub use hash::ContentHash;
pub use tenant::{TenantKey, TenantLocator};
pub use upload::{ChunkSession, UploadId, UploadPurpose};

/// Pinned Ghost version string clients use for feature gating.
pub const GHOST_VERSION: &str = "5.82.0";
