//! GitHub Actions environment secrets.
//!
//! ## Endpoints
//!
//! - `GET  /repos/{owner}/{repo}/environments/{env}/secrets/public-key`
//! - `PUT  /repos/{owner}/{repo}/environments/{env}/secrets/{name}`
//!
//! Every request carries the bearer token, the GitHub media type and the
//! pinned `X-GitHub-Api-Version`.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{KeyResolver, Publisher};
use crate::core::config::GitHubConfig;
use crate::core::constants::{API_VERSION_HEADER, GITHUB_ACCEPT, GITHUB_API_VERSION};
use crate::core::domain::{Environment, EnvironmentKey, SealedSecret};
use crate::error::{ConfigError, KeyResolutionError, PublishError, Result, TransportError};

/// Longest response body quoted in an error message.
const MAX_BODY_IN_ERROR: usize = 200;

#[derive(Debug, Deserialize)]
struct PublicKeyResponse {
    key_id: String,
    key: String,
}

#[derive(Debug, Serialize)]
struct PutSecretRequest<'a> {
    encrypted_value: &'a str,
    key_id: &'a str,
}

/// Client for one repository's environment secrets.
pub struct GitHubClient {
    client: reqwest::Client,
    base: Url,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Build a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API URL is not a usable base URL or the
    /// HTTP client cannot be built.
    pub fn new(config: GitHubConfig, timeout: std::time::Duration) -> Result<Self> {
        let base = Url::parse(&config.api_url).map_err(|e| ConfigError::InvalidValue {
            field: "GITHUB_API_URL",
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "GITHUB_API_URL",
                reason: format!("not a base URL: {}", config.api_url),
            }
            .into());
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("pipeseal/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// URL for a path under `/repos/{owner}/{repo}/environments/{env}/secrets`.
    fn secrets_url(&self, environment: &str, leaf: &str) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "repos",
                self.config.owner.as_str(),
                self.config.repo.as_str(),
                "environments",
                environment,
                "secrets",
                leaf,
            ]);
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(self.config.token())
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(API_VERSION_HEADER, GITHUB_API_VERSION)
    }
}

#[async_trait]
impl KeyResolver for GitHubClient {
    async fn fetch_key(&self, environment: &Environment) -> Result<EnvironmentKey> {
        let name = environment.name();
        let url = self.secrets_url(name, "public-key");
        debug!(environment = name, %url, "fetching public key");

        let transport = |source: TransportError| KeyResolutionError::Transport {
            environment: name.to_string(),
            source,
        };

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| transport(e.into()))?;

        let status = response.status();
        if status.is_success() {
            let body: PublicKeyResponse =
                response.json().await.map_err(|e| transport(e.into()))?;
            let key = EnvironmentKey::from_base64(body.key_id, &body.key).map_err(|source| {
                KeyResolutionError::InvalidKey {
                    environment: name.to_string(),
                    source,
                }
            })?;
            debug!(environment = name, key_id = key.key_id(), "public key resolved");
            return Ok(key);
        }

        let body = error_body(response).await;
        let err = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => KeyResolutionError::Unauthorized {
                environment: name.to_string(),
                status: status.as_u16(),
            },
            StatusCode::NOT_FOUND => KeyResolutionError::NotFound {
                environment: name.to_string(),
            },
            s if is_transient(s) => transport(TransportError::Status {
                status: s.as_u16(),
                body,
            }),
            s => KeyResolutionError::Rejected {
                environment: name.to_string(),
                status: s.as_u16(),
                body,
            },
        };
        Err(err.into())
    }
}

#[async_trait]
impl Publisher for GitHubClient {
    async fn publish(
        &self,
        environment: &Environment,
        name: &str,
        sealed: &SealedSecret,
    ) -> Result<()> {
        let url = self.secrets_url(environment.name(), name);
        debug!(
            environment = environment.name(),
            secret = name,
            key_id = sealed.key_id(),
            "publishing secret"
        );

        let body = PutSecretRequest {
            encrypted_value: sealed.ciphertext(),
            key_id: sealed.key_id(),
        };

        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport {
                secret: name.to_string(),
                source: e.into(),
            })?;

        let status = response.status();
        if status.is_success() {
            let action = if status == StatusCode::CREATED {
                "created"
            } else {
                "updated"
            };
            info!(environment = environment.name(), secret = name, action, "published");
            return Ok(());
        }

        let body = error_body(response).await;
        let err = match status {
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => PublishError::StaleKey {
                key_id: sealed.key_id().to_string(),
            },
            s if is_transient(s) => PublishError::Transport {
                secret: name.to_string(),
                source: TransportError::Status {
                    status: s.as_u16(),
                    body,
                },
            },
            s => PublishError::Rejected {
                secret: name.to_string(),
                status: s.as_u16(),
                body,
            },
        };
        Err(err.into())
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

async fn error_body(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    let text = text.trim();
    if text.chars().count() > MAX_BODY_IN_ERROR {
        let cut: String = text.chars().take(MAX_BODY_IN_ERROR).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
