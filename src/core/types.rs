//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A GitHub secret name (e.g., DISTRIBUTION_ID).
pub type SecretName = String;

/// An opaque identifier naming which store key sealed a value.
pub type KeyId = String;

/// Base64 text of a sealed box.
pub type Ciphertext = String;

/// A GitHub deployment environment name.
pub type EnvironmentName = String;
