//! Key command - show an environment's current public key.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::domain::Environment;
use crate::core::store::{GitHubClient, KeyResolver};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct KeyInfo<'a> {
    environment: &'a str,
    key_id: &'a str,
    key: String,
}

/// Fetch and print the key for `environment`.
///
/// The environment does not need to be listed in the manifest.
pub async fn execute(manifest: Option<&Path>, environment: &str, json: bool) -> Result<i32> {
    info!(environment, "fetching key");

    let config = Config::from_env(manifest)?;
    let client = GitHubClient::new(config.github.clone(), config.timeout)?;
    let key = client.fetch_key(&Environment::new(environment)).await?;

    let info = KeyInfo {
        environment,
        key_id: key.key_id(),
        key: key.to_base64(),
    };

    if json {
        output::json(&info)?;
    } else {
        output::header(&output::name(environment));
        output::kv("key_id:", info.key_id);
        output::kv("key:   ", &info.key);
    }

    Ok(0)
}
