//! Sync report types.
//!
//! A sync run has no single terminal status: the report records the outcome
//! of every (environment, secret) pair and derives the overall status from
//! them.

use serde::Serialize;

use crate::error::{Error, FailureKind};

/// Why one unit of work failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}

/// Outcome of a single secret in a single environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SecretOutcome {
    /// Uploaded under the given key id.
    Published { key_id: String },
    /// Sealed but not uploaded (dry run).
    Sealed { key_id: String },
    Failed(Failure),
}

impl SecretOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: SecretOutcome,
}

/// Per-environment lifecycle.
///
/// `Pending -> KeyResolved -> {Sealing -> Publishing}* -> Done | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentState {
    Pending,
    KeyResolved,
    Sealing,
    Publishing,
    Done,
    Failed,
}

impl std::fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::KeyResolved => "key_resolved",
            Self::Sealing => "sealing",
            Self::Publishing => "publishing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Final record for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentReport {
    pub environment: String,
    pub state: EnvironmentState,
    /// Set when the key could not be resolved. No secrets were attempted and
    /// each one carries this failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_error: Option<Failure>,
    pub secrets: Vec<SecretReport>,
}

impl EnvironmentReport {
    /// Report for an environment whose key could not be fetched. Every
    /// secret in `names` is recorded as failed with the key failure.
    pub fn key_failed<'a>(
        environment: impl Into<String>,
        failure: Failure,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let secrets = names
            .into_iter()
            .map(|name| SecretReport {
                name: name.to_string(),
                outcome: SecretOutcome::Failed(failure.clone()),
            })
            .collect();
        Self {
            environment: environment.into(),
            state: EnvironmentState::Failed,
            key_error: Some(failure),
            secrets,
        }
    }

    /// Report from per-secret results. `Done` only if all succeeded.
    pub fn from_secrets(environment: impl Into<String>, secrets: Vec<SecretReport>) -> Self {
        let state = if secrets.iter().all(|s| s.outcome.is_success()) {
            EnvironmentState::Done
        } else {
            EnvironmentState::Failed
        };
        Self {
            environment: environment.into(),
            state,
            key_error: None,
            secrets,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == EnvironmentState::Done
    }

    /// Names of secrets that failed in this environment.
    pub fn failed_secrets(&self) -> Vec<&str> {
        self.secrets
            .iter()
            .filter(|s| !s.outcome.is_success())
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Number of secrets that succeeded.
    pub fn succeeded(&self) -> usize {
        self.secrets
            .iter()
            .filter(|s| s.outcome.is_success())
            .count()
    }

    /// Outcome for a named secret.
    pub fn secret(&self, name: &str) -> Option<&SecretOutcome> {
        self.secrets
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.outcome)
    }
}

/// Overall result of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every environment reached `Done`.
    Complete,
    /// Some secrets made it; the pipeline may still work.
    Partial,
    /// Nothing succeeded.
    Failed,
}

impl RunStatus {
    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Complete => 0,
            Self::Failed => 1,
            Self::Partial => 2,
        }
    }
}

/// Result of a sync run across all environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub status: RunStatus,
    pub dry_run: bool,
    pub environments: Vec<EnvironmentReport>,
}

impl SyncReport {
    pub fn new(environments: Vec<EnvironmentReport>, dry_run: bool) -> Self {
        let status = if !environments.is_empty() && environments.iter().all(|e| e.is_done()) {
            RunStatus::Complete
        } else if environments.iter().any(|e| e.succeeded() > 0) {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };
        Self {
            status,
            dry_run,
            environments,
        }
    }

    /// Report for a named environment.
    pub fn environment(&self, name: &str) -> Option<&EnvironmentReport> {
        self.environments.iter().find(|e| e.environment == name)
    }

    /// Every failed (environment, secret) pair. A key failure in an
    /// environment with no secrets is reported with `None`.
    pub fn failures(&self) -> Vec<(&str, Option<&str>, &Failure)> {
        let mut out = Vec::new();
        for env in &self.environments {
            if let (Some(failure), true) = (&env.key_error, env.secrets.is_empty()) {
                out.push((env.environment.as_str(), None, failure));
            }
            for secret in &env.secrets {
                if let SecretOutcome::Failed(failure) = &secret.outcome {
                    out.push((env.environment.as_str(), Some(secret.name.as_str()), failure));
                }
            }
        }
        out
    }
}
