//! Environment types.
//!
//! A deployment environment and the store key currently assigned to it.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::constants::PUBLIC_KEY_LEN;
use crate::core::types::{EnvironmentName, KeyId};
use crate::error::EncodingError;

/// A GitHub deployment environment targeted by a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Environment {
    name: EnvironmentName,
    /// Prefix prepended to dynamic lookup aliases, e.g. `stage` gives
    /// `stage-pizza.example.net`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias_prefix: Option<String>,
}

impl Environment {
    /// Environment whose aliases use the bare subdomain.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias_prefix: None,
        }
    }

    /// Environment whose aliases are prefixed with `prefix-`.
    pub fn with_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias_prefix: Some(prefix.into()),
        }
    }

    /// Environment name as known to the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias prefix, if any.
    pub fn alias_prefix(&self) -> Option<&str> {
        self.alias_prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// Domain alias this environment uses for `subdomain` under `domain`.
    pub fn alias_for(&self, subdomain: &str, domain: &str) -> String {
        match self.alias_prefix() {
            Some(prefix) => format!("{}-{}.{}", prefix, subdomain, domain),
            None => format!("{}.{}", subdomain, domain),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Public key the store currently uses for one environment.
///
/// Valid for a single sync pass; never shared between environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentKey {
    key_id: KeyId,
    public_key: [u8; PUBLIC_KEY_LEN],
}

impl EnvironmentKey {
    /// Create from raw key bytes.
    pub fn new(key_id: impl Into<KeyId>, public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self {
            key_id: key_id.into(),
            public_key,
        }
    }

    /// Decode the base64 key returned by the store.
    ///
    /// # Errors
    ///
    /// Returns `EncodingError` if the text is not base64 or does not decode
    /// to exactly 32 bytes.
    pub fn from_base64(key_id: impl Into<KeyId>, key: &str) -> Result<Self, EncodingError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(key.trim())?;
        let public_key: [u8; PUBLIC_KEY_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| EncodingError::KeyLength {
                    expected: PUBLIC_KEY_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self::new(key_id, public_key))
    }

    /// Identifier the store uses to pick its private key.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Raw X25519 public key.
    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.public_key
    }

    /// Public key as standard base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.public_key)
    }
}
