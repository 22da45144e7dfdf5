//! Reversible payload protection keyed by a named purpose.
//!
//! Authorization state crosses the browser redirect boundary as an opaque
//! blob. The [`Protector`] capability seals and unseals such payloads; the
//! purpose string binds a blob to one leg of the flow so a blob protected for
//! one purpose can never be unsealed under another.
//!
//! The default implementation uses AES-256-GCM with a random nonce per call
//! and the purpose as additional authenticated data. The issue timestamp is
//! sealed into the envelope so stale blobs unprotect as absent.

use std::time::Duration;

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use rand::RngCore;
use time::OffsetDateTime;

use crate::error::AuthError;
use crate::AuthResult;

/// Nonce size for AES-256-GCM (96 bits).
const NONCE_SIZE: usize = 12;

/// Key size for AES-256 (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of the sealed issue timestamp (unix seconds, big endian).
const TIMESTAMP_SIZE: usize = 8;

/// Named protection purposes used by the flow engine.
pub mod purposes {
    /// Protects the authorization state crossing the `/authorize` -> callback leg.
    pub const AUTHORIZATION_STATE: &str = "AuthorizationStateProtection";

    /// Protects token material handed to downstream commands.
    pub const TOKEN: &str = "TokenProtection";
}

/// Capability for sealing and unsealing opaque byte payloads.
///
/// `protect` may be non-deterministic in ciphertext; callers must treat the
/// output as opaque. `unprotect` fails closed: malformed, truncated, expired,
/// or wrong-purpose input yields `None`, never a partial payload.
pub trait Protector: Send + Sync {
    /// Seals a payload under the given purpose.
    fn protect(&self, plaintext: &[u8], purpose: &str) -> AuthResult<Vec<u8>>;

    /// Unseals a payload previously sealed under the same purpose.
    fn unprotect(&self, payload: &[u8], purpose: &str) -> Option<Vec<u8>>;
}

/// AES-256-GCM [`Protector`] with TTL enforcement.
///
/// Envelope layout: `nonce (12) || ciphertext(timestamp (8) || plaintext)`.
/// The purpose string is bound as additional authenticated data, so the same
/// key can serve multiple purposes without blobs being replayable across legs.
#[derive(Clone)]
pub struct AesGcmProtector {
    key: [u8; KEY_SIZE],
    max_age: Option<Duration>,
}

impl AesGcmProtector {
    /// Creates a protector with the given key and no TTL.
    #[must_use]
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key, max_age: None }
    }

    /// Sets the maximum age a sealed payload stays unsealable.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Generates a new random key.
    #[must_use]
    pub fn generate_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    fn cipher(&self) -> AuthResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| AuthError::internal(format!("Failed to create cipher: {e}")))
    }
}

impl Protector for AesGcmProtector {
    fn protect(&self, plaintext: &[u8], purpose: &str) -> AuthResult<Vec<u8>> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let issued_at = OffsetDateTime::now_utc().unix_timestamp();
        let mut envelope = Vec::with_capacity(TIMESTAMP_SIZE + plaintext.len());
        envelope.extend_from_slice(&issued_at.to_be_bytes());
        envelope.extend_from_slice(plaintext);

        let ciphertext = cipher
            .encrypt(
                nonce,
                Payload {
                    msg: &envelope,
                    aad: purpose.as_bytes(),
                },
            )
            .map_err(|e| AuthError::internal(format!("Encryption failed: {e}")))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn unprotect(&self, payload: &[u8], purpose: &str) -> Option<Vec<u8>> {
        if payload.len() <= NONCE_SIZE {
            return None;
        }
        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = self.cipher().ok()?;
        let envelope = cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad: purpose.as_bytes(),
                },
            )
            .ok()?;

        if envelope.len() < TIMESTAMP_SIZE {
            return None;
        }
        let (timestamp_bytes, plaintext) = envelope.split_at(TIMESTAMP_SIZE);
        let issued_at = i64::from_be_bytes(timestamp_bytes.try_into().ok()?);

        if let Some(max_age) = self.max_age {
            let now = OffsetDateTime::now_utc().unix_timestamp();
            let age = now.checked_sub(issued_at)?;
            if age < 0 || age as u64 > max_age.as_secs() {
                return None;
            }
        }

        Some(plaintext.to_vec())
    }
}

impl std::fmt::Debug for AesGcmProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmProtector")
            .field("key", &"<redacted>")
            .field("max_age", &self.max_age)
            .finish()
    }
}
