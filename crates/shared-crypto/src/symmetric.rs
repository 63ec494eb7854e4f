//! # Symmetric Payload Encryption
//!
//! AES-256-GCM over the SMS wire format:
//!
//! ```text
//! base64( nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! ## Security Properties
//!
//! - Tag verification happens before any plaintext leaves this module
//! - Malformed base64, short buffers, and tag mismatches all fail closed

use crate::key_derivation::{KeyCandidate, KeyMaterial};
use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Smallest decodable payload: an empty ciphertext still carries nonce and tag.
pub const MIN_PAYLOAD_LEN: usize = NONCE_LEN + TAG_LEN;

// Devices differ on trailing padding; accept both, emit padded.
const WIRE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode and size-check a wire payload.
fn decode_wire(base64_input: &str) -> Result<Vec<u8>, CryptoError> {
    let combined = WIRE_BASE64
        .decode(base64_input.trim())
        .map_err(|_| CryptoError::MalformedEncoding)?;

    if combined.len() < MIN_PAYLOAD_LEN {
        return Err(CryptoError::PayloadTooShort {
            minimum: MIN_PAYLOAD_LEN,
            actual: combined.len(),
        });
    }

    Ok(combined)
}

/// Verify and decrypt `nonce || ciphertext || tag` under one key.
fn open(combined: &[u8], key: &KeyMaterial) -> Result<Vec<u8>, CryptoError> {
    let (nonce, sealed) = combined.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    // aes-gcm expects the tag appended to the ciphertext, which is the wire layout.
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::AuthenticationFailed)
}

/// Decrypt a base64 wire payload with AES-256-GCM.
///
/// # Errors
///
/// - `MalformedEncoding`: input is not base64
/// - `PayloadTooShort`: decoded length below nonce + tag
/// - `AuthenticationFailed`: wrong key or tampered bytes
pub fn decrypt_payload(base64_input: &str, key: &KeyMaterial) -> Result<Vec<u8>, CryptoError> {
    let combined = decode_wire(base64_input)?;
    open(&combined, key)
}

/// Trial-decrypt a payload against several candidate keys.
///
/// The payload is decoded once. Returns the index of the first candidate whose
/// tag verifies, together with the plaintext.
///
/// # Errors
///
/// Same as [`decrypt_payload`]; `AuthenticationFailed` when no candidate fits
/// and `NoCandidateKeys` when `candidates` is empty.
pub fn decrypt_with_any(
    base64_input: &str,
    candidates: &[KeyCandidate],
) -> Result<(usize, Vec<u8>), CryptoError> {
    let combined = decode_wire(base64_input)?;

    if candidates.is_empty() {
        return Err(CryptoError::NoCandidateKeys);
    }

    for (index, candidate) in candidates.iter().enumerate() {
        if let Ok(plaintext) = open(&combined, &candidate.key) {
            return Ok((index, plaintext));
        }
    }

    Err(CryptoError::AuthenticationFailed)
}

/// Encrypt plaintext into the wire format with a random nonce.
///
/// This is the device-side operation.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn encrypt_payload(plaintext: &[u8], key: &KeyMaterial) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);
    encrypt_payload_with_nonce(plaintext, key, nonce)
}

/// Encrypt with a caller-chosen nonce.
///
/// Never reuse a nonce under the same key; this exists for fixed fixtures.
pub fn encrypt_payload_with_nonce(
    plaintext: &[u8],
    key: &KeyMaterial,
    nonce: [u8; NONCE_LEN],
) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut combined = Vec::with_capacity(NONCE_LEN + sealed.len());
    combined.extend_from_slice(&nonce);
    combined.extend_from_slice(&sealed);
    Ok(WIRE_BASE64.encode(combined))
}
