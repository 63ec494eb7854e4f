//! # Shared Crypto - Key Derivation and Payload Decryption
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `key_derivation` | HMAC-SHA256 | Per-group AES key from the shared secret |
//! | `symmetric` | AES-256-GCM | Authenticated decryption of SMS payloads |
//!
//! ## Wire Format
//!
//! ```text
//! base64( nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! ## Security Properties
//!
//! - **AES-256-GCM**: any modified byte of nonce, ciphertext, or tag fails closed
//! - **KeyMaterial**: zeroized on drop, redacted in `Debug`
//! - No plaintext is returned before tag verification succeeds

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod key_derivation;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use key_derivation::{
    derive_group_key, GroupKeyRing, KeyCandidate, KeyMaterial, SharedSecret, KEY_LEN,
};
pub use symmetric::{
    decrypt_payload, decrypt_with_any, encrypt_payload, encrypt_payload_with_nonce,
    MIN_PAYLOAD_LEN, NONCE_LEN, TAG_LEN,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
