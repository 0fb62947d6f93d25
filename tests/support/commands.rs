//! Command helper methods for Test.

use super::fixtures::{OWNER, REPO, TOKEN};
use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables the binary reads. Cleared so the host environment never leaks in.
const VARS: &[&str] = &[
    "GITHUB_TOKEN",
    "REPO_OWNER",
    "REPO_NAME",
    "GITHUB_API_URL",
    "DOMAIN_NAME",
    "BUCKET_NAME",
    "AWS_ACCOUNT",
    "IAM_ROLE",
    "PIPESEAL_LOG",
    "PIPESEAL_MANIFEST",
    "PIPESEAL_TIMEOUT_SECS",
];

impl Test {
    /// Create a pipeseal command with no configuration at all.
    pub fn bare_cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("pipeseal").expect("failed to find pipeseal binary");
        for var in VARS {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Create a pipeseal command with repository coordinates and a token.
    pub fn cmd(&self) -> Command {
        let mut cmd = self.bare_cmd();
        cmd.env("GITHUB_TOKEN", TOKEN)
            .env("REPO_OWNER", OWNER)
            .env("REPO_NAME", REPO)
            .env("AWS_ACCOUNT", "123456789012");
        cmd
    }

    /// Same as [`Test::cmd`] but talking to `api_url`.
    pub fn cmd_against(&self, api_url: &str) -> Command {
        let mut cmd = self.cmd();
        cmd.env("GITHUB_API_URL", api_url)
            .env("PIPESEAL_TIMEOUT_SECS", "5");
        cmd
    }

    /// Shortcut for `pipeseal check`.
    pub fn check(&self) -> Output {
        self.cmd()
            .arg("check")
            .output()
            .expect("failed to run pipeseal check")
    }

    /// Shortcut for `pipeseal check --json`.
    pub fn check_json(&self) -> Output {
        self.cmd()
            .args(["check", "--json"])
            .output()
            .expect("failed to run pipeseal check --json")
    }

    /// `pipeseal sync --json` against `api_url`, run off the async runtime
    /// so the mock server keeps serving.
    pub async fn sync_json(&self, api_url: &str, extra: &[&str]) -> Output {
        let mut cmd = self.cmd_against(api_url);
        cmd.args(["sync", "--json"]).args(extra);
        run_blocking(cmd).await
    }
}

/// Run a command on the blocking pool.
pub async fn run_blocking(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().expect("failed to run pipeseal"))
        .await
        .expect("command task panicked")
}
