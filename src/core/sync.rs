//! Sync orchestration.
//!
//! For every environment: resolve its key once, then resolve, seal and
//! publish each secret independently. A failure is confined to the smallest
//! unit that failed. A bad key fails one environment, a bad secret fails one
//! pair, and the run always visits every environment.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use zeroize::Zeroizing;

use crate::core::cipher;
use crate::core::config::Config;
use crate::core::constants::RETRY_BACKOFF;
use crate::core::domain::{
    Environment, EnvironmentKey, EnvironmentReport, EnvironmentState, Failure, SecretDefinition,
    SecretOutcome, SecretReport, SyncReport, ValueSource,
};
use crate::core::locator::ResourceLocator;
use crate::core::store::{KeyResolver, Publisher};
use crate::core::validation;
use crate::error::{ResolutionError, Result};

/// Drives one sync run over every configured environment.
pub struct Synchronizer {
    environments: Vec<Environment>,
    secrets: Vec<SecretDefinition>,
    keys: Arc<dyn KeyResolver>,
    publisher: Arc<dyn Publisher>,
    locator: Option<Arc<dyn ResourceLocator>>,
    backoff: Duration,
    dry_run: bool,
}

impl Synchronizer {
    /// Orchestrator for the environments and secrets in `config`.
    pub fn new(config: &Config, keys: Arc<dyn KeyResolver>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            environments: config.environments.clone(),
            secrets: config.secrets.clone(),
            keys,
            publisher,
            locator: None,
            backoff: RETRY_BACKOFF,
            dry_run: false,
        }
    }

    /// Locator for dynamic secrets. Without one, dynamic secrets fail.
    pub fn with_locator(mut self, locator: Arc<dyn ResourceLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Pause before retrying a transport failure.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Seal everything but publish nothing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run over every environment. Never stops early.
    pub async fn run(&self) -> SyncReport {
        info!(
            environments = self.environments.len(),
            secrets = self.secrets.len(),
            dry_run = self.dry_run,
            "starting sync"
        );

        let mut reports = Vec::with_capacity(self.environments.len());
        for environment in &self.environments {
            let span = info_span!("environment", name = environment.name());
            let report = self.sync_environment(environment).instrument(span).await;
            reports.push(report);
        }

        let report = SyncReport::new(reports, self.dry_run);
        info!(status = ?report.status, "sync finished");
        report
    }

    async fn sync_environment(&self, environment: &Environment) -> EnvironmentReport {
        transition(environment, EnvironmentState::Pending);

        let mut key = match self.fetch_key(environment).await {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "key resolution failed, skipping environment");
                transition(environment, EnvironmentState::Failed);
                return EnvironmentReport::key_failed(
                    environment.name(),
                    Failure::from(&e),
                    self.secrets.iter().map(SecretDefinition::name),
                );
            }
        };
        transition(environment, EnvironmentState::KeyResolved);

        let mut secrets = Vec::with_capacity(self.secrets.len());
        for definition in &self.secrets {
            let outcome = match self.sync_secret(environment, definition, &mut key).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(secret = definition.name(), kind = %e.kind(), error = %e, "secret failed");
                    SecretOutcome::Failed(Failure::from(&e))
                }
            };
            secrets.push(SecretReport {
                name: definition.name().to_string(),
                outcome,
            });
        }

        let report = EnvironmentReport::from_secrets(environment.name(), secrets);
        transition(environment, report.state);
        if report.is_done() {
            info!(secrets = report.succeeded(), "environment done");
        } else {
            warn!(failed = ?report.failed_secrets(), "environment failed");
        }
        report
    }

    /// Resolve, seal and publish one secret with `key`.
    ///
    /// A stale key is refreshed in place so later secrets in the same
    /// environment use the new one.
    async fn sync_secret(
        &self,
        environment: &Environment,
        definition: &SecretDefinition,
        key: &mut EnvironmentKey,
    ) -> Result<SecretOutcome> {
        let name = definition.name();
        let value = Zeroizing::new(self.resolve_value(environment, definition).await?);
        if validation::validate_value(name, &value).is_err() {
            return Err(ResolutionError::Empty(name.to_string()).into());
        }

        transition(environment, EnvironmentState::Sealing);
        let sealed = cipher::seal(key, value.as_str())?;

        if self.dry_run {
            debug!(secret = name, "dry run, not publishing");
            return Ok(SecretOutcome::Sealed {
                key_id: sealed.key_id().to_string(),
            });
        }

        transition(environment, EnvironmentState::Publishing);
        let published = self
            .retry_once("publish", || self.publisher.publish(environment, name, &sealed))
            .await;

        match published {
            Ok(()) => Ok(SecretOutcome::Published {
                key_id: sealed.key_id().to_string(),
            }),
            Err(e) if e.is_stale_key() => {
                warn!(secret = name, key_id = key.key_id(), "key rotated, refreshing");
                *key = self.fetch_key(environment).await?;
                let resealed = cipher::seal(key, value.as_str())?;
                self.retry_once("publish", || {
                    self.publisher.publish(environment, name, &resealed)
                })
                .await?;
                Ok(SecretOutcome::Published {
                    key_id: resealed.key_id().to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_key(&self, environment: &Environment) -> Result<EnvironmentKey> {
        self.retry_once("key fetch", || self.keys.fetch_key(environment))
            .await
    }

    async fn resolve_value(
        &self,
        environment: &Environment,
        definition: &SecretDefinition,
    ) -> Result<String> {
        match definition.source() {
            ValueSource::Static(value) => Ok(value.clone()),
            ValueSource::Dynamic(rule) => {
                let locator = self
                    .locator
                    .as_ref()
                    .ok_or_else(|| ResolutionError::MissingDomain(definition.name().to_string()))?;
                self.retry_once("lookup", || locator.resolve(environment, rule))
                    .await
            }
        }
    }

    /// Run `op`, retrying exactly once after the backoff if it failed with a
    /// transport-class error.
    async fn retry_once<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match op().await {
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "{} failed, retrying once", what);
                tokio::time::sleep(self.backoff).await;
                op().await
            }
            other => other,
        }
    }
}

fn transition(environment: &Environment, state: EnvironmentState) {
    debug!(environment = environment.name(), %state, "state");
}
