//! Configuration loading.
//!
//! Everything a sync run needs is read once at startup into an immutable
//! [`Config`]: credentials and repository coordinates from environment
//! variables, and the environment/secret layout from `pipeseal.toml` (or the
//! built-in default manifest when no file exists).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::{self, vars};
use crate::core::domain::{Environment, LookupRule, SecretDefinition, ValueSource};
use crate::core::validation;
use crate::error::{ConfigError, Result, ValidationError};

/// Source of configuration values, usually the process environment.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Remote store coordinates and credentials.
#[derive(Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    token: Zeroizing<String>,
}

impl GitHubConfig {
    pub fn new(
        api_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            owner: owner.into(),
            repo: repo.into(),
            token: Zeroizing::new(token.into()),
        }
    }

    /// Bearer token for the store API.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GitHubConfig,
    /// Base domain for dynamic lookups.
    pub domain: Option<String>,
    pub environments: Vec<Environment>,
    pub secrets: Vec<SecretDefinition>,
    /// Per network call.
    pub timeout: Duration,
}

/// Declarative layout of environments and secrets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub secrets: Vec<SecretEntry>,
}

/// One `[[secrets]]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawSecretEntry")]
pub struct SecretEntry {
    pub name: String,
    #[serde(flatten)]
    pub source: SourceEntry,
}

/// How a manifest entry gets its value. Exactly one per entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourceEntry {
    /// Id of the CloudFront distribution serving this subdomain.
    Distribution { distribution: String },
    /// Static value read from an environment variable at startup.
    FromEnv { from_env: String },
    /// Static literal.
    Literal { value: String },
}

/// `[[secrets]]` table as written, before checking it names one source.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSecretEntry {
    name: String,
    distribution: Option<String>,
    from_env: Option<String>,
    value: Option<String>,
}

impl TryFrom<RawSecretEntry> for SecretEntry {
    type Error = String;

    fn try_from(raw: RawSecretEntry) -> std::result::Result<Self, Self::Error> {
        let source = match (raw.distribution, raw.from_env, raw.value) {
            (Some(distribution), None, None) => SourceEntry::Distribution { distribution },
            (None, Some(from_env), None) => SourceEntry::FromEnv { from_env },
            (None, None, Some(value)) => SourceEntry::Literal { value },
            (None, None, None) => {
                return Err(format!(
                    "secret {} needs one of `distribution`, `from_env` or `value`",
                    raw.name
                ))
            }
            _ => {
                return Err(format!(
                    "secret {} sets more than one of `distribution`, `from_env` and `value`",
                    raw.name
                ))
            }
        };
        Ok(Self {
            name: raw.name,
            source,
        })
    }
}

impl SecretEntry {
    fn new(name: &str, source: SourceEntry) -> Self {
        Self {
            name: name.to_string(),
            source,
        }
    }
}

impl Manifest {
    /// Parse a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e).into())
    }

    /// Load a manifest file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadManifest` if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading manifest");
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ReadManifest {
                path: path.display().to_string(),
                source,
            })?;
        Self::parse(&contents)
    }

    /// Explicit path if given, else `pipeseal.toml` in the current directory
    /// if present, else the built-in default.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = PathBuf::from(constants::MANIFEST_FILE);
                if local.exists() {
                    Self::load(&local)
                } else {
                    debug!("no manifest found, using built-in layout");
                    Ok(Self::default())
                }
            }
        }
    }
}

impl Default for Manifest {
    /// Production and staging, with the CloudFront distribution id plus the
    /// bucket, account and CI role passed through from the environment.
    fn default() -> Self {
        Self {
            environments: vec![
                Environment::new("production"),
                Environment::with_prefix("staging", "stage"),
            ],
            secrets: vec![
                SecretEntry::new(
                    "DISTRIBUTION_ID",
                    SourceEntry::Distribution {
                        distribution: "pizza".into(),
                    },
                ),
                SecretEntry::new(
                    "APP_BUCKET",
                    SourceEntry::FromEnv {
                        from_env: vars::BUCKET_NAME.into(),
                    },
                ),
                SecretEntry::new(
                    "AWS_ACCOUNT",
                    SourceEntry::FromEnv {
                        from_env: vars::AWS_ACCOUNT.into(),
                    },
                ),
                SecretEntry::new(
                    "CI_IAM_ROLE",
                    SourceEntry::FromEnv {
                        from_env: vars::IAM_ROLE.into(),
                    },
                ),
            ],
        }
    }
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for missing variables or an unreadable manifest,
    /// and `ValidationError` for an invalid layout.
    pub fn from_env(manifest: Option<&Path>) -> Result<Self> {
        let manifest = Manifest::discover(manifest)?;
        Self::load(&|name| std::env::var(name).ok(), manifest)
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn load(lookup: Lookup<'_>, manifest: Manifest) -> Result<Self> {
        let github = GitHubConfig::new(
            optional(lookup, vars::GITHUB_API_URL)
                .unwrap_or_else(|| constants::DEFAULT_API_URL.to_string()),
            required(lookup, vars::REPO_OWNER)?,
            required(lookup, vars::REPO_NAME)?,
            required(lookup, vars::GITHUB_TOKEN)?,
        );

        let timeout = match optional(lookup, vars::TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    field: vars::TIMEOUT_SECS,
                    reason: format!("not a number of seconds: {}", raw),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: vars::TIMEOUT_SECS,
                        reason: "must be greater than zero".into(),
                    }
                    .into());
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
        };

        let secrets = manifest
            .secrets
            .into_iter()
            .map(|entry| -> Result<SecretDefinition> {
                let source = match entry.source {
                    SourceEntry::Distribution { distribution } => {
                        ValueSource::Dynamic(LookupRule::Distribution {
                            subdomain: distribution,
                        })
                    }
                    SourceEntry::FromEnv { from_env } => {
                        ValueSource::Static(required(lookup, &from_env)?)
                    }
                    SourceEntry::Literal { value } => ValueSource::Static(value),
                };
                Ok(SecretDefinition::new(entry.name, source))
            })
            .collect::<Result<Vec<_>>>()?;

        let config = Self {
            github,
            domain: optional(lookup, vars::DOMAIN_NAME),
            environments: manifest.environments,
            secrets,
            timeout,
        };

        config.validate()?;

        debug!(
            environments = config.environments.len(),
            secrets = config.secrets.len(),
            "config loaded"
        );

        Ok(config)
    }

    /// Validate the layout.
    ///
    /// Checks:
    /// - At least one environment, names non-empty and unique
    /// - Secret names valid for GitHub and unique
    /// - Static values non-empty
    /// - `DOMAIN_NAME` set when any secret is dynamic
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` or `ValidationError` on the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.environments.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "environments",
                reason: "at least one environment is required".into(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for env in &self.environments {
            if env.name().trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "environments",
                    reason: "environment name cannot be empty".into(),
                }
                .into());
            }
            if !seen.insert(env.name()) {
                return Err(ValidationError::Duplicate {
                    what: "environment",
                    name: env.name().to_string(),
                }
                .into());
            }
        }

        let mut seen = HashSet::new();
        for secret in &self.secrets {
            validation::validate_secret_name(secret.name())?;
            if !seen.insert(secret.name()) {
                return Err(ValidationError::Duplicate {
                    what: "secret",
                    name: secret.name().to_string(),
                }
                .into());
            }
            if let ValueSource::Static(value) = secret.source() {
                validation::validate_value(secret.name(), value)?;
            }
        }

        let needs_domain = self
            .secrets
            .iter()
            .any(|s| matches!(s.source(), ValueSource::Dynamic(_)));
        if needs_domain && self.domain.is_none() {
            return Err(ConfigError::MissingVar(vars::DOMAIN_NAME.to_string()).into());
        }

        Ok(())
    }

    /// Restrict the run to the named environments, keeping manifest order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` for a name not in the layout.
    pub fn select_environments(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        for name in names {
            if !self.environments.iter().any(|e| e.name() == name) {
                return Err(ConfigError::UnknownEnvironment(name.clone()).into());
            }
        }
        self.environments
            .retain(|e| names.iter().any(|n| n == e.name()));
        Ok(())
    }
}

fn optional(lookup: Lookup<'_>, name: &str) -> Option<String> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: Lookup<'_>, name: &str) -> Result<String> {
    match lookup(name) {
        None => Err(ConfigError::MissingVar(name.to_string()).into()),
        Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyVar {
            var: name.to_string(),
        }
        .into()),
        Some(v) => Ok(v.trim().to_string()),
    }
}
