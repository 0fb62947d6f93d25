//! Remote secret store.
//!
//! The store owns one keypair per environment and accepts sealed values
//! under a key id. Two seams are exposed so the orchestrator can be driven
//! by any store (or a test double):
//!
//! - [`KeyResolver`]: fetch an environment's current public key
//! - [`Publisher`]: create or overwrite a sealed secret
//!
//! ## Adding a New Store
//!
//! 1. Implement both traits
//! 2. Add the implementation in a new file (e.g., `gitlab.rs`)
//! 3. Re-export from this module

use async_trait::async_trait;

use crate::core::domain::{Environment, EnvironmentKey, SealedSecret};
use crate::error::Result;

mod github;

pub use github::GitHubClient;

/// Fetches the current public key of an environment.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// One authenticated read scoped to `environment`.
    ///
    /// # Errors
    ///
    /// Returns `KeyResolutionError` if the environment is unknown, access is
    /// denied, the transport fails, or the key is malformed.
    async fn fetch_key(&self, environment: &Environment) -> Result<EnvironmentKey>;
}

/// Uploads sealed secrets.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Create or overwrite `name` in `environment`. Safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::StaleKey` if the store no longer accepts the
    /// sealed value's key id, `PublishError::Transport` on network failure,
    /// and `PublishError::Rejected` for any other refusal.
    async fn publish(
        &self,
        environment: &Environment,
        name: &str,
        sealed: &SealedSecret,
    ) -> Result<()>;
}
