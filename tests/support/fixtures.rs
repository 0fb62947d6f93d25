//! Test fixtures and constants.

use crypto_box::aead::OsRng;
use crypto_box::SecretKey;
use pipeseal::core::config::{Config, GitHubConfig};
use pipeseal::core::domain::{Environment, EnvironmentKey, SecretDefinition};
use std::time::Duration;

pub const TOKEN: &str = "ghp_test_token";
pub const OWNER: &str = "acme";
pub const REPO: &str = "pizza";
pub const DOMAIN: &str = "example.net";

/// Two environments and static secrets only. Needs no AWS access.
pub const STATIC_MANIFEST: &str = r#"
[[environments]]
name = "production"

[[environments]]
name = "staging"
alias_prefix = "stage"

[[secrets]]
name = "APP_BUCKET"
value = "my-bucket"

[[secrets]]
name = "AWS_ACCOUNT"
from_env = "AWS_ACCOUNT"
"#;

/// Same layout plus a distribution lookup.
pub const DYNAMIC_MANIFEST: &str = r#"
[[environments]]
name = "production"

[[environments]]
name = "staging"
alias_prefix = "stage"

[[secrets]]
name = "DISTRIBUTION_ID"
distribution = "pizza"

[[secrets]]
name = "APP_BUCKET"
value = "my-bucket"
"#;

/// A fresh recipient keypair. The secret half opens what the public half
/// seals.
pub struct Keypair {
    pub secret: SecretKey,
    pub key: EnvironmentKey,
}

impl Keypair {
    pub fn generate(key_id: &str) -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let key = EnvironmentKey::new(key_id, *secret.public_key().as_bytes());
        Self { secret, key }
    }
}

/// Configuration pointing at `api_url` with the given layout.
pub fn config(
    api_url: &str,
    environments: Vec<Environment>,
    secrets: Vec<SecretDefinition>,
) -> Config {
    Config {
        github: GitHubConfig::new(api_url, OWNER, REPO, TOKEN),
        domain: Some(DOMAIN.to_string()),
        environments,
        secrets,
        timeout: Duration::from_secs(5),
    }
}

/// Production plus a `stage`-prefixed staging environment.
pub fn environments() -> Vec<Environment> {
    vec![
        Environment::new("production"),
        Environment::with_prefix("staging", "stage"),
    ]
}

/// The default layout: one distribution lookup and three static values.
pub fn secrets() -> Vec<SecretDefinition> {
    vec![
        SecretDefinition::distribution("DISTRIBUTION_ID", "pizza"),
        SecretDefinition::fixed("APP_BUCKET", "my-bucket"),
        SecretDefinition::fixed("AWS_ACCOUNT", "123456789012"),
        SecretDefinition::fixed("CI_IAM_ROLE", "arn:aws:iam::123456789012:role/ci"),
    ]
}
