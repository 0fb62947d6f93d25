//! Sync command - seal and publish every secret to every environment.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::cli::{output, LocatorKind};
use crate::core::config::Config;
use crate::core::domain::{RunStatus, SecretOutcome, SyncReport};
use crate::core::locator::{AwsCli, DistributionLocator, ResourceLocator};
use crate::core::store::GitHubClient;
use crate::core::sync::Synchronizer;
use crate::error::Result;

/// Run a full sync and print the summary. Returns the exit code.
pub async fn execute(
    manifest: Option<&Path>,
    environments: &[String],
    dry_run: bool,
    json: bool,
    locator: LocatorKind,
) -> Result<i32> {
    info!(dry_run, ?locator, "running sync");

    let mut config = Config::from_env(manifest)?;
    config.select_environments(environments)?;

    let client = Arc::new(GitHubClient::new(config.github.clone(), config.timeout)?);
    let mut synchronizer = Synchronizer::new(&config, client.clone(), client).dry_run(dry_run);
    if let Some(domain) = &config.domain {
        synchronizer = synchronizer.with_locator(build_locator(locator, domain, &config).await?);
    }

    let report = synchronizer.run().await;

    if json {
        output::json(&report)?;
    } else {
        print_summary(&report);
    }

    Ok(report.status.exit_code())
}

async fn build_locator(
    kind: LocatorKind,
    domain: &str,
    config: &Config,
) -> Result<Arc<dyn ResourceLocator>> {
    match kind {
        LocatorKind::AwsCli => Ok(Arc::new(DistributionLocator::new(
            AwsCli::new(config.timeout),
            domain,
        ))),
        #[cfg(feature = "aws")]
        LocatorKind::AwsSdk => {
            use crate::core::locator::cloudfront::CloudFrontSdk;
            Ok(Arc::new(DistributionLocator::new(
                CloudFrontSdk::from_env(config.timeout).await,
                domain,
            )))
        }
        #[cfg(not(feature = "aws"))]
        LocatorKind::AwsSdk => Err(crate::error::ConfigError::InvalidValue {
            field: "locator",
            reason: "AWS SDK support not compiled. Rebuild with: cargo install pipeseal --features aws".into(),
        }
        .into()),
    }
}

fn print_summary(report: &SyncReport) {
    for env in &report.environments {
        output::section(&format!("{} ({})", output::name(&env.environment), env.state));

        if let Some(failure) = &env.key_error {
            output::failure(&format!("key: [{}] {}", failure.kind, failure.message));
            continue;
        }

        for secret in &env.secrets {
            match &secret.outcome {
                SecretOutcome::Published { key_id } => {
                    output::success(&format!("{}  published (key {})", secret.name, key_id))
                }
                SecretOutcome::Sealed { key_id } => {
                    output::success(&format!("{}  sealed (key {}, not published)", secret.name, key_id))
                }
                SecretOutcome::Failed(failure) => output::failure(&format!(
                    "{}  [{}] {}",
                    secret.name, failure.kind, failure.message
                )),
            }
        }
    }

    println!();
    let done = report.environments.iter().filter(|e| e.is_done()).count();
    let total = report.environments.len();
    let prefix = if report.dry_run { "dry run: " } else { "" };
    match report.status {
        RunStatus::Complete => output::success(&format!(
            "{}all {} environment(s) in sync",
            prefix, total
        )),
        RunStatus::Partial => output::warn(&format!(
            "{}partial success: {} of {} environment(s) done, {} failure(s)",
            prefix,
            done,
            total,
            report.failures().len()
        )),
        RunStatus::Failed => output::failure(&format!(
            "{}sync failed: no secrets published",
            prefix
        )),
    }
}
