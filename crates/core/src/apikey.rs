//! Admin API key material and secret-encoding candidates.
//!
//! Ghost Admin API keys are `id:secret` hex pairs. The id half is public and
//! doubles as the JWT `kid` header; the secret half signs short-lived HS256
//! tokens. Different client implementations disagree on how the secret is
//! turned into signing-key bytes, so the closed candidate list lives here too.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of the public key-id half, in hex characters.
pub const KEY_ID_LEN: usize = 24;

/// Length of the secret half, in hex characters.
pub const SECRET_LEN: usize = 64;

fn is_lower_hex(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Public identifier half of an Admin API key (24 hex chars).
///
/// This is the value a client puts in the JWT `kid` header.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Generate a fresh random key id.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_ID_LEN / 2];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse from a string, validating length and charset.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.len() != KEY_ID_LEN || !is_lower_hex(s) {
            return Err(crate::Error::InvalidKeyId(format!(
                "expected {KEY_ID_LEN} lowercase hex chars"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the key id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secret half of an Admin API key (64 hex chars).
///
/// Never logged or serialized in full; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSecret(String);

impl ApiSecret {
    /// Generate a fresh random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_LEN / 2];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse from a string, validating length and charset.
    pub fn parse(s: &str) -> crate::Result<Self> {
        if s.len() != SECRET_LEN || !is_lower_hex(s) {
            return Err(crate::Error::InvalidSecret(format!(
                "expected {SECRET_LEN} lowercase hex chars"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the secret as a string slice.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiSecret").field(&"<redacted>").finish()
    }
}

/// A full Admin API key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminApiKey {
    pub key_id: KeyId,
    pub secret: ApiSecret,
}

impl AdminApiKey {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self {
            key_id: KeyId::generate(),
            secret: ApiSecret::generate(),
        }
    }

    /// Parse the `id:secret` wire form.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let (id, secret) = s
            .split_once(':')
            .ok_or_else(|| crate::Error::InvalidToken("missing ':' separator".to_string()))?;
        Ok(Self {
            key_id: KeyId::parse(id)?,
            secret: ApiSecret::parse(secret)?,
        })
    }

    /// Encode as the `id:secret` wire form.
    pub fn to_token_string(&self) -> String {
        format!("{}:{}", self.key_id, self.secret.expose())
    }
}

/// Check whether a token matches the raw `24hex:64hex` Admin API key pattern.
///
/// Raw keys in the Authorization header are a legacy path; real Ghost clients
/// send JWTs, but both must be accepted.
pub fn is_raw_key_token(token: &str) -> bool {
    let Some((id, secret)) = token.split_once(':') else {
        return false;
    };
    id.len() == KEY_ID_LEN
        && secret.len() == SECRET_LEN
        && is_lower_hex(id)
        && is_lower_hex(secret)
}

/// Candidate interpretations of the shared secret as HS256 key bytes.
///
/// Clients disagree on whether the hex secret string is the key itself or an
/// encoding of the key. The list is closed; verification tries each in order
/// and accepts the first that validates the signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecretEncoding {
    /// The secret string's bytes, as-is.
    Raw,
    /// The secret hex-decoded to 32 bytes.
    Hex,
    /// The secret base64-decoded.
    Base64,
    /// The secret re-encoded as UTF-8. Identical to `Raw` for the hex
    /// alphabet, kept so the candidate list matches what clients do.
    Utf8,
}

impl SecretEncoding {
    /// All candidates, in verification order.
    pub const CANDIDATES: [SecretEncoding; 4] = [Self::Raw, Self::Hex, Self::Base64, Self::Utf8];

    /// Decode the secret under this interpretation. Returns `None` when the
    /// secret is not valid input for the encoding.
    pub fn key_bytes(&self, secret: &ApiSecret) -> Option<Vec<u8>> {
        match self {
            Self::Raw => Some(secret.expose().as_bytes().to_vec()),
            Self::Hex => hex::decode(secret.expose()).ok(),
            Self::Base64 => {
                use base64::Engine;
                base64::engine::general_purpose::STANDARD
                    .decode(secret.expose())
                    .ok()
            }
            Self::Utf8 => Some(secret.expose().as_bytes().to_vec()),
        }
    }
}

/// An authenticated caller: the blog and user a verified credential is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub blog_id: Uuid,
    pub user_id: Uuid,
    /// Key id the credential was matched under.
    pub key_id: KeyId,
}
