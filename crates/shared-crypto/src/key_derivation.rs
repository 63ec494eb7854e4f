//! # Per-Group Key Derivation
//!
//! Each device group encrypts under its own AES-256 key:
//!
//! ```text
//! key = HMAC-SHA256(key = shared_secret, message = group_id)
//! ```
//!
//! The raw 32-byte digest is used directly as the AES-256-GCM key.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Derived AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Root secret shared between the devices and the ingest service.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when no secret material is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SharedSecret {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Symmetric key (256-bit), owned by a single decrypt call.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial([u8; KEY_LEN]);

impl KeyMaterial {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(<redacted>)")
    }
}

/// Derive the AES-256 key for `group_id`.
///
/// Deterministic: identical inputs always produce the identical key.
pub fn derive_group_key(secret: &SharedSecret, group_id: &str) -> KeyMaterial {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(group_id.as_bytes());

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&mac.finalize().into_bytes());
    KeyMaterial(bytes)
}

/// A key to try during trial decryption, tagged with the group it belongs to.
///
/// `group_id` is `None` for the root key, which is not bound to any group.
#[derive(Debug, Clone)]
pub struct KeyCandidate {
    /// Group the key was derived for.
    pub group_id: Option<String>,
    /// Derived key.
    pub key: KeyMaterial,
}

/// The set of group keys derivable from one shared secret.
///
/// Compact envelopes carry no cleartext group, so the receiver tries every
/// known group's key; the AEAD tag identifies the right one.
#[derive(Debug, Clone)]
pub struct GroupKeyRing {
    secret: SharedSecret,
    groups: Vec<String>,
    root_fallback: bool,
}

impl GroupKeyRing {
    /// Create a key ring over the given known groups.
    ///
    /// Group ids are trimmed; empty and repeated ids are ignored.
    pub fn new<I, S>(secret: SharedSecret, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for group in groups {
            let group = group.as_ref().trim();
            if !group.is_empty() && !unique.iter().any(|g| g == group) {
                unique.push(group.to_string());
            }
        }

        Self {
            secret,
            groups: unique,
            root_fallback: false,
        }
    }

    /// Also offer `derive(secret, "")` as a last candidate.
    pub fn with_root_fallback(mut self, enabled: bool) -> Self {
        self.root_fallback = enabled;
        self
    }

    /// Key for a group named in cleartext (addressed envelopes).
    pub fn key_for(&self, group_id: &str) -> KeyMaterial {
        derive_group_key(&self.secret, group_id)
    }

    /// All candidate keys, known groups first, root key last.
    pub fn candidates(&self) -> Vec<KeyCandidate> {
        let mut candidates: Vec<KeyCandidate> = self
            .groups
            .iter()
            .map(|group| KeyCandidate {
                group_id: Some(group.clone()),
                key: derive_group_key(&self.secret, group),
            })
            .collect();

        if self.root_fallback {
            candidates.push(KeyCandidate {
                group_id: None,
                key: derive_group_key(&self.secret, ""),
            });
        }

        candidates
    }

    /// Known group ids.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Whether the root key is offered.
    pub fn root_fallback(&self) -> bool {
        self.root_fallback
    }

    /// True when trial decryption has nothing to try.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && !self.root_fallback
    }
}
