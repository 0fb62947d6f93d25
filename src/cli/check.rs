//! Check command - validate configuration and print the sync plan.
//!
//! Makes no network calls. Static values are never printed.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::domain::{LookupRule, ValueSource};
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct Plan {
    pub repository: String,
    pub api_url: String,
    pub environments: Vec<EnvironmentPlan>,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentPlan {
    pub name: String,
    pub secrets: Vec<SecretPlan>,
}

#[derive(Debug, Serialize)]
pub struct SecretPlan {
    pub name: String,
    pub source: &'static str,
    /// Domain alias a dynamic lookup will match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl Plan {
    pub fn from_config(config: &Config) -> Self {
        let environments = config
            .environments
            .iter()
            .map(|env| EnvironmentPlan {
                name: env.name().to_string(),
                secrets: config
                    .secrets
                    .iter()
                    .map(|secret| SecretPlan {
                        name: secret.name().to_string(),
                        source: secret.source().label(),
                        alias: match (secret.source(), &config.domain) {
                            (
                                ValueSource::Dynamic(LookupRule::Distribution { subdomain }),
                                Some(domain),
                            ) => Some(env.alias_for(subdomain, domain)),
                            _ => None,
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            repository: format!("{}/{}", config.github.owner, config.github.repo),
            api_url: config.github.api_url.clone(),
            environments,
        }
    }
}

/// Validate configuration and print the plan.
pub fn execute(manifest: Option<&Path>, environments: &[String], json: bool) -> Result<i32> {
    info!("running check");

    let mut config = Config::from_env(manifest)?;
    config.select_environments(environments)?;
    let plan = Plan::from_config(&config);

    if json {
        output::json(&plan)?;
        return Ok(0);
    }

    output::header(&format!("Repository {}", output::name(&plan.repository)));
    output::kv("api:", &plan.api_url);

    for env in &plan.environments {
        output::section(&output::name(&env.name));
        if env.secrets.is_empty() {
            output::dimmed("no secrets defined");
        }
        for secret in &env.secrets {
            match &secret.alias {
                Some(alias) => {
                    output::list_item(&format!("{}  ({} → {})", secret.name, secret.source, alias))
                }
                None => output::list_item(&format!("{}  ({})", secret.name, secret.source)),
            }
        }
    }

    println!();
    output::success("configuration is valid");
    Ok(0)
}
