//! Command-line interface.

pub mod check;
pub mod key;
pub mod output;
pub mod sync;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// pipeseal - Seal deployment configuration into GitHub Actions environment secrets.
#[derive(Parser)]
#[command(
    name = "pipeseal",
    about = "Seal deployment configuration into GitHub Actions environment secrets",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Manifest describing environments and secrets
    #[arg(long, global = true, env = "PIPESEAL_MANIFEST")]
    pub manifest: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Resolve, seal and publish every secret to every environment
    Sync {
        /// Only sync these environments (repeatable)
        #[arg(long = "env", value_name = "NAME")]
        environments: Vec<String>,
        /// Seal values but do not publish them
        #[arg(long)]
        dry_run: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// How to look up dynamic values
        #[arg(long, value_enum, default_value_t = LocatorKind::AwsCli)]
        locator: LocatorKind,
    },

    /// Validate configuration and show what a sync would do
    Check {
        /// Only show these environments (repeatable)
        #[arg(long = "env", value_name = "NAME")]
        environments: Vec<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an environment's current public key
    Key {
        /// Environment name
        environment: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log output format.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Backend for dynamic value lookups.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocatorKind {
    /// `aws cloudfront list-distributions`
    AwsCli,
    /// CloudFront API (requires the `aws` feature)
    AwsSdk,
}

/// Execute a command, returning the process exit code.
pub fn execute(command: Command, manifest: Option<PathBuf>) -> Result<i32> {
    use Command::*;

    let manifest = manifest.as_deref();
    match command {
        Sync {
            environments,
            dry_run,
            json,
            locator,
        } => block_on(sync::execute(manifest, &environments, dry_run, json, locator))?,
        Check { environments, json } => check::execute(manifest, &environments, json),
        Key { environment, json } => block_on(key::execute(manifest, &environment, json))?,
    }
}

/// Run a future on a single-threaded runtime.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ConfigError::Runtime)?;
    Ok(rt.block_on(future))
}
