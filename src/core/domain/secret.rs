//! Secret definitions and sealed values.

use serde::Serialize;

use crate::core::types::{Ciphertext, KeyId, SecretName};

/// A named secret and the rule producing its plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretDefinition {
    name: SecretName,
    source: ValueSource,
}

impl SecretDefinition {
    /// Create a definition from a name and value source.
    pub fn new(name: impl Into<SecretName>, source: ValueSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Secret with the same value in every environment.
    pub fn fixed(name: impl Into<SecretName>, value: impl Into<String>) -> Self {
        Self::new(name, ValueSource::Static(value.into()))
    }

    /// Secret holding the id of the distribution serving `subdomain`.
    pub fn distribution(name: impl Into<SecretName>, subdomain: impl Into<String>) -> Self {
        Self::new(
            name,
            ValueSource::Dynamic(LookupRule::Distribution {
                subdomain: subdomain.into(),
            }),
        )
    }

    /// Secret name in the store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the plaintext comes from.
    pub fn source(&self) -> &ValueSource {
        &self.source
    }
}

/// Where a secret's plaintext comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Constant across all environments.
    Static(String),
    /// Looked up per environment from live infrastructure.
    Dynamic(LookupRule),
}

impl ValueSource {
    /// Short label for plans and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Static(_) => "static",
            Self::Dynamic(_) => "dynamic",
        }
    }
}

// Static values are plaintext secrets.
impl std::fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::Dynamic(rule) => f.debug_tuple("Dynamic").field(rule).finish(),
        }
    }
}

/// A predicate over live infrastructure state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupRule {
    /// The CloudFront distribution aliased to `<prefix>-<subdomain>.<domain>`.
    Distribution { subdomain: String },
}

/// A value sealed for one environment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    key_id: KeyId,
    ciphertext: Ciphertext,
}

impl SealedSecret {
    /// Pair a base64 ciphertext with the key id that sealed it.
    pub fn new(key_id: impl Into<KeyId>, ciphertext: impl Into<Ciphertext>) -> Self {
        Self {
            key_id: key_id.into(),
            ciphertext: ciphertext.into(),
        }
    }

    /// Key id the ciphertext was sealed under.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Base64 sealed box.
    pub fn ciphertext(&self) -> &str {
        &self.ciphertext
    }
}
