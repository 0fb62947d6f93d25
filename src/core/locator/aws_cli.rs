//! CloudFront inventory via the AWS CLI.
//!
//! ## Requirements
//!
//! - `aws` CLI v2 installed and authenticated (profile, SSO or env vars)
//! - `cloudfront:ListDistributions` permission
//!
//! The CLI paginates on its own, so one invocation returns every distribution.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use super::{Distribution, DistributionSource};
use crate::error::{Result, TransportError};

/// Lists distributions by running `aws cloudfront list-distributions`.
pub struct AwsCli {
    program: String,
    timeout: Duration,
}

impl AwsCli {
    /// Use `aws` from `PATH`.
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("aws", timeout)
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DistributionSource for AwsCli {
    async fn list_distributions(&self) -> Result<Vec<Distribution>> {
        debug!(program = %self.program, "listing cloudfront distributions");

        let child = Command::new(&self.program)
            .args(["cloudfront", "list-distributions", "--output", "json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransportError::Command {
                program: self.program.clone(),
                reason: format!("failed to spawn: {}", e),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| TransportError::Timeout {
                program: self.program.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| TransportError::Command {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Command {
                program: self.program.clone(),
                reason: if stderr.trim().is_empty() {
                    format!("exited with {}", output.status)
                } else {
                    stderr.trim().to_string()
                },
            }
            .into());
        }

        trace!(stdout_len = output.stdout.len(), "aws cli returned");
        parse_list_output(&output.stdout)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListOutput {
    #[serde(default)]
    distribution_list: Option<DistributionList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DistributionList {
    #[serde(default)]
    items: Vec<Summary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Summary {
    id: String,
    #[serde(default)]
    aliases: Option<Aliases>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Aliases {
    #[serde(default)]
    items: Vec<String>,
}

/// Parse `list-distributions --output json`. Empty output means no
/// distributions.
fn parse_list_output(stdout: &[u8]) -> Result<Vec<Distribution>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let parsed: ListOutput = serde_json::from_slice(stdout)
        .map_err(|e| TransportError::Malformed(format!("list-distributions: {}", e)))?;

    Ok(parsed
        .distribution_list
        .map(|list| list.items)
        .unwrap_or_default()
        .into_iter()
        .map(|s| Distribution {
            id: s.id,
            aliases: s.aliases.map(|a| a.items).unwrap_or_default(),
        })
        .collect())
}
