//! Tests for `pipeseal key`.

use crate::support::*;

use wiremock::MockServer;

#[tokio::test(flavor = "multi_thread")]
async fn test_key_prints_id_and_key() {
    let server = MockServer::start().await;
    let keypair = Keypair::generate("568250167242549743");
    mock_public_key(&server, "staging", &keypair.key).await;
    let t = Test::with_manifest(STATIC_MANIFEST);

    let mut cmd = t.cmd_against(&server.uri());
    cmd.args(["key", "staging"]);
    let output = run_blocking(cmd).await;
    assert_success(&output);
    assert_stdout_contains(&output, "568250167242549743");
    assert_stdout_contains(&output, &keypair.key.to_base64());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_key_json() {
    let server = MockServer::start().await;
    let keypair = Keypair::generate("k-9");
    mock_public_key(&server, "production", &keypair.key).await;
    let t = Test::with_manifest(STATIC_MANIFEST);

    let mut cmd = t.cmd_against(&server.uri());
    cmd.args(["key", "production", "--json"]);
    let output = run_blocking(cmd).await;
    assert_success(&output);
    let info = stdout_json(&output);
    assert_eq!(info["environment"], "production");
    assert_eq!(info["key_id"], "k-9");
    assert_eq!(info["key"], keypair.key.to_base64());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_key_unknown_environment() {
    let server = MockServer::start().await;
    mock_key_status(&server, "qa", 404).await;
    let t = Test::with_manifest(STATIC_MANIFEST);

    let mut cmd = t.cmd_against(&server.uri());
    cmd.args(["key", "qa"]);
    let output = run_blocking(cmd).await;
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "environment 'qa' not found");
}
