//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Duration;

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl AppConfig {
    /// Create a test configuration with temp-friendly defaults.
    ///
    /// **For testing only.** Tests override the storage and metadata paths
    /// with temp directories before use.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
                ..ServerConfig::default()
            },
            admin: AdminConfig::for_testing(),
            storage: StorageConfig::default(),
            metadata: MetadataConfig::default(),
        }
    }
}

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public base URL used in Ghost-shaped site/user/image responses.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Hard ceiling on upload payloads, in bytes.
    ///
    /// Matches the hosting platform's request-body limit so the gateway
    /// rejects with a readable message before the platform cuts the
    /// connection.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Idle timeout before an abandoned chunk session is evicted, in seconds.
    #[serde(default = "default_chunk_idle_timeout_secs")]
    pub chunk_idle_timeout_secs: u64,
    /// Interval between chunk-session eviction sweeps, in seconds.
    #[serde(default = "default_chunk_sweep_interval_secs")]
    pub chunk_sweep_interval_secs: u64,
    /// Default TTL for issued Admin API keys, in seconds.
    #[serde(default = "default_key_ttl_secs")]
    pub key_ttl_secs: u64,
}

impl ServerConfig {
    /// Get the chunk-session idle timeout as a Duration.
    pub fn chunk_idle_timeout(&self) -> Duration {
        let secs = i64::try_from(self.chunk_idle_timeout_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs)
    }

    /// Get the default key TTL as a Duration.
    pub fn key_ttl(&self) -> Duration {
        let secs = i64::try_from(self.key_ttl_secs).unwrap_or(i64::MAX);
        Duration::seconds(secs)
    }
}

/// Operator admin token configuration.
///
/// Key issuance and revocation are dashboard actions; the dashboard proves
/// itself to the gateway with this shared token. Only its SHA-256 hash is
/// configured.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Pre-computed hash of the admin token (SHA-256 hex, 64 characters).
    /// Generate with: `echo -n "your-secret-token" | sha256sum`
    pub token_hash: String,
}

impl AdminConfig {
    /// Create a test configuration with a dummy token hash.
    ///
    /// **For testing only.** SHA-256 of "test-admin-token".
    pub fn for_testing() -> Self {
        Self {
            token_hash: "17d6bfe05d1b1fb7bc499f8e3f639c7b3eda4c40f321eef8887a0c04c89a99c5"
                .to_string(),
        }
    }
}

/// Blob storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for stored blobs.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/blobs"),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database file.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_public_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_max_upload_bytes() -> u64 {
    // 4.5 MiB, the serverless platform body ceiling the original deploys under.
    4_718_592
}

fn default_chunk_idle_timeout_secs() -> u64 {
    900
}

fn default_chunk_sweep_interval_secs() -> u64 {
    60
}

fn default_key_ttl_secs() -> u64 {
    90 * 86400
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: default_public_url(),
            max_upload_bytes: default_max_upload_bytes(),
            chunk_idle_timeout_secs: default_chunk_idle_timeout_secs(),
            chunk_sweep_interval_secs: default_chunk_sweep_interval_secs(),
            key_ttl_secs: default_key_ttl_secs(),
        }
    }
}
