//! Constants used throughout pipeseal.
//!
//! Centralizes magic strings and protocol values.

use std::time::Duration;

/// Default manifest file name, looked up in the current directory.
pub const MANIFEST_FILE: &str = "pipeseal.toml";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type advertised on every GitHub request.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub REST API version pinned for the secrets endpoints.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Header carrying [`GITHUB_API_VERSION`].
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pause before the single retry of a transport failure.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Length of an X25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Bytes a sealed box adds to the plaintext: ephemeral public key plus MAC.
pub const SEAL_OVERHEAD: usize = 32 + 16;

/// Secret name prefix reserved by GitHub.
pub const RESERVED_PREFIX: &str = "GITHUB_";

/// Environment variable names read at startup.
pub mod vars {
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    pub const REPO_OWNER: &str = "REPO_OWNER";
    pub const REPO_NAME: &str = "REPO_NAME";
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    pub const DOMAIN_NAME: &str = "DOMAIN_NAME";
    pub const BUCKET_NAME: &str = "BUCKET_NAME";
    pub const AWS_ACCOUNT: &str = "AWS_ACCOUNT";
    pub const IAM_ROLE: &str = "IAM_ROLE";
    pub const TIMEOUT_SECS: &str = "PIPESEAL_TIMEOUT_SECS";
}
