//! CloudFront inventory via the AWS SDK.
//!
//! Enable with `--features aws`. Credentials come from the default provider
//! chain (environment, profile, SSO, instance metadata).

use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use std::time::Duration;
use tracing::{debug, trace};

use super::{Distribution, DistributionSource};
use crate::error::{Result, TransportError};

/// Lists distributions through the CloudFront API.
pub struct CloudFrontSdk {
    client: Client,
}

impl CloudFrontSdk {
    /// Load AWS config from the environment with a per-operation timeout.
    pub async fn from_env(timeout: Duration) -> Self {
        let timeouts = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(timeout)
            .build();
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .timeout_config(timeouts)
            .load()
            .await;
        Self {
            client: Client::new(&config),
        }
    }
}

#[async_trait]
impl DistributionSource for CloudFrontSdk {
    async fn list_distributions(&self) -> Result<Vec<Distribution>> {
        let mut found = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            debug!(marker = ?marker, "listing cloudfront distributions");
            let output = self
                .client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| TransportError::Provider(format!("ListDistributions: {}", e)))?;

            let Some(list) = output.distribution_list() else {
                break;
            };

            for summary in list.items() {
                let aliases = summary
                    .aliases()
                    .map(|a| a.items().to_vec())
                    .unwrap_or_default();
                found.push(Distribution {
                    id: summary.id().to_string(),
                    aliases,
                });
            }

            marker = list
                .next_marker()
                .filter(|_| list.is_truncated())
                .map(str::to_string);
            if marker.is_none() {
                break;
            }
        }

        trace!(count = found.len(), "listed distributions");
        Ok(found)
    }
}
