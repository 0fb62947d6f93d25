//! pipeseal - Seal deployment configuration into GitHub Actions environment secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pipeseal::cli::output;
use pipeseal::cli::{execute, Cli, LogFormat};
use pipeseal::error::{ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("PIPESEAL_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("pipeseal=debug")
        } else {
            EnvFilter::new("pipeseal=warn")
        }
    });

    // Logs go to stderr so `--json` output on stdout stays parseable
    let text = (cli.log_format == LogFormat::Text).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });
    let json = (cli.log_format == LogFormat::Json)
        .then(|| fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();

    match execute(cli.command, cli.manifest) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let suggestion = match &e {
                Error::Config(ConfigError::MissingVar(var))
                | Error::Config(ConfigError::EmptyVar { var }) => {
                    Some(format!("export {}=...", var))
                }
                Error::Config(ConfigError::UnknownEnvironment(_)) => {
                    Some("run: pipeseal check".to_string())
                }
                Error::Config(ConfigError::Parse(_)) => {
                    Some("see pipeseal.toml in the README for the manifest format".to_string())
                }
                _ => None,
            };

            output::error(&e.to_string());
            if let Some(hint) = suggestion {
                output::hint(&hint);
            }
            std::process::exit(1);
        }
    }
}
