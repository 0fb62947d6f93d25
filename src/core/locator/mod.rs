//! Resource lookup against live infrastructure.
//!
//! Dynamic secrets are resolved here: given an environment and a
//! [`LookupRule`], find exactly one resource identifier. Zero matches and
//! ambiguous matches are both errors.
//!
//! ## Backends
//!
//! - **aws-cli**: shells out to `aws cloudfront list-distributions`
//! - **aws-sdk**: Feature-gated (`aws`). Uses the CloudFront API directly.

use async_trait::async_trait;
use tracing::debug;

use crate::core::domain::{Environment, LookupRule};
use crate::error::{ResolutionError, Result};

mod aws_cli;

#[cfg(feature = "aws")]
pub mod cloudfront;

pub use aws_cli::AwsCli;

/// Resolves a lookup rule to a single identifier for one environment.
#[async_trait]
pub trait ResourceLocator: Send + Sync {
    /// # Errors
    ///
    /// Returns `ResolutionError` when nothing or more than one resource
    /// matches, and `TransportError` when the provider cannot be queried.
    async fn resolve(&self, environment: &Environment, rule: &LookupRule) -> Result<String>;
}

/// A CloudFront distribution as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub id: String,
    pub aliases: Vec<String>,
}

impl Distribution {
    pub fn new(id: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            id: id.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Lists distributions from some provider.
#[async_trait]
pub trait DistributionSource: Send + Sync {
    /// Every distribution visible to the current credentials.
    async fn list_distributions(&self) -> Result<Vec<Distribution>>;
}

/// Locator answering `Distribution` rules from a [`DistributionSource`].
pub struct DistributionLocator<S> {
    source: S,
    domain: String,
}

impl<S: DistributionSource> DistributionLocator<S> {
    pub fn new(source: S, domain: impl Into<String>) -> Self {
        Self {
            source,
            domain: domain.into(),
        }
    }
}

#[async_trait]
impl<S: DistributionSource> ResourceLocator for DistributionLocator<S> {
    async fn resolve(&self, environment: &Environment, rule: &LookupRule) -> Result<String> {
        match rule {
            LookupRule::Distribution { subdomain } => {
                let alias = environment.alias_for(subdomain, &self.domain);
                debug!(environment = environment.name(), %alias, "looking up distribution");
                let distributions = self.source.list_distributions().await?;
                match_distribution(&distributions, &alias)
            }
        }
    }
}

/// Pick the single distribution carrying `alias`.
///
/// Alias comparison ignores ASCII case and a trailing dot.
///
/// # Errors
///
/// Returns `ResolutionError::NoMatch` for no match, `Ambiguous` for more than
/// one, and `Empty` if the matching distribution has a blank id.
pub fn match_distribution(distributions: &[Distribution], alias: &str) -> Result<String> {
    let wanted = normalize(alias);
    let matches: Vec<&Distribution> = distributions
        .iter()
        .filter(|d| d.aliases.iter().any(|a| normalize(a) == wanted))
        .collect();

    match matches.as_slice() {
        [] => Err(ResolutionError::NoMatch {
            alias: alias.to_string(),
        }
        .into()),
        [only] => {
            let id = only.id.trim();
            if id.is_empty() {
                return Err(ResolutionError::Empty(alias.to_string()).into());
            }
            Ok(id.to_string())
        }
        many => Err(ResolutionError::Ambiguous {
            alias: alias.to_string(),
            ids: many.iter().map(|d| d.id.clone()).collect(),
        }
        .into()),
    }
}

fn normalize(alias: &str) -> String {
    alias.trim().trim_end_matches('.').to_ascii_lowercase()
}
