//! Authorization flow engine configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! login_url = "https://login.example.com/signin"
//! protection_key = "000102030405060708090a0b0c0d0e0f000102030405060708090a0b0c0d0e0f"
//! state_ttl = "15m"
//! ```

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::protect::{AesGcmProtector, KEY_SIZE};

/// Configuration errors raised while materializing the engine.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The protection key could not be parsed.
    #[error("Invalid protection key: {0}")]
    InvalidKey(String),
}

impl ConfigError {
    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }
}

/// Root flow engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// External login surface the authorize endpoint redirects to. The opaque
    /// authorization state is appended as the `authorizationState` query
    /// parameter.
    pub login_url: Url,

    /// Key for the authorization-state protector, hex or base64 encoded,
    /// 32 bytes. When absent a random per-process key is generated, which
    /// invalidates in-flight states on restart.
    pub protection_key: Option<String>,

    /// How long a protected authorization state stays redeemable.
    #[serde(with = "humantime_serde")]
    pub state_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_url: Url::parse("http://localhost:8080/signin")
                .unwrap_or_else(|_| unreachable!("static URL parses")),
            protection_key: None,
            state_ttl: Duration::from_secs(15 * 60),
        }
    }
}

impl AuthConfig {
    /// Builds the authorization-state protector from this configuration.
    pub fn protector(&self) -> Result<AesGcmProtector, ConfigError> {
        let key = match &self.protection_key {
            Some(key_str) => parse_key(key_str)?,
            None => AesGcmProtector::generate_key(),
        };
        Ok(AesGcmProtector::new(key).with_max_age(self.state_ttl))
    }
}

/// Parses a key from a hex or base64 string.
fn parse_key(key_str: &str) -> Result<[u8; KEY_SIZE], ConfigError> {
    // Try hex first
    if key_str.len() == KEY_SIZE * 2 {
        if let Ok(bytes) = hex::decode(key_str) {
            if bytes.len() == KEY_SIZE {
                let mut key = [0u8; KEY_SIZE];
                key.copy_from_slice(&bytes);
                return Ok(key);
            }
        }
    }

    // Try base64
    let bytes = BASE64
        .decode(key_str.trim())
        .map_err(|e| ConfigError::invalid_key(format!("Invalid base64 key: {e}")))?;

    if bytes.len() != KEY_SIZE {
        return Err(ConfigError::invalid_key(format!(
            "Key must be {} bytes, got {}",
            KEY_SIZE,
            bytes.len()
        )));
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&bytes);
    Ok(key)
}
