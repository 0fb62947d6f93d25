//! Mock GitHub environment secrets API.
//!
//! Paths follow `/repos/{OWNER}/{REPO}/environments/{env}/secrets/...`.

use pipeseal::core::domain::EnvironmentKey;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{OWNER, REPO};

pub fn key_path(environment: &str) -> String {
    format!(
        "/repos/{}/{}/environments/{}/secrets/public-key",
        OWNER, REPO, environment
    )
}

pub fn secret_path(environment: &str, name: &str) -> String {
    format!(
        "/repos/{}/{}/environments/{}/secrets/{}",
        OWNER, REPO, environment, name
    )
}

/// Serve `key` as the environment's public key.
pub async fn mock_public_key(server: &MockServer, environment: &str, key: &EnvironmentKey) {
    Mock::given(method("GET"))
        .and(path(key_path(environment)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key_id": key.key_id(),
            "key": key.to_base64(),
        })))
        .mount(server)
        .await;
}

/// Answer the key request with a bare status.
pub async fn mock_key_status(server: &MockServer, environment: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(key_path(environment)))
        .respond_with(ResponseTemplate::new(status).set_body_string("{\"message\":\"nope\"}"))
        .mount(server)
        .await;
}

/// Accept every secret upload for `environment` with `status`.
pub async fn mock_accept_all(server: &MockServer, environment: &str, status: u16) {
    Mock::given(method("PUT"))
        .and(wiremock::matchers::path_regex(format!(
            "^/repos/{}/{}/environments/{}/secrets/[A-Z0-9_]+$",
            OWNER, REPO, environment
        )))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Answer one secret's upload with `status`, `times` times.
pub async fn mock_put_status(
    server: &MockServer,
    environment: &str,
    name: &str,
    status: u16,
    times: u64,
) {
    Mock::given(method("PUT"))
        .and(path(secret_path(environment, name)))
        .respond_with(ResponseTemplate::new(status).set_body_string("{\"message\":\"nope\"}"))
        .up_to_n_times(times)
        .with_priority(1)
        .mount(server)
        .await;
}

/// JSON bodies of every PUT to `environment`/`name`.
pub async fn uploads(server: &MockServer, environment: &str, name: &str) -> Vec<serde_json::Value> {
    let wanted = secret_path(environment, name);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "PUT" && r.url.path() == wanted)
        .map(|r| serde_json::from_slice(&r.body).expect("upload body is JSON"))
        .collect()
}
