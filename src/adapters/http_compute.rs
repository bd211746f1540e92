//! Compute control-plane REST adapter
//!
//! Thin client over the instance API: describe state, describe health
//! checks, start, reboot. Every failure is wrapped as an action error
//! naming the call and the instance, which is what the escalation path
//! reports upstream.

use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::compute::{HealthChecks, InstanceActions, InstanceProbe};
use crate::config::ComputeConfig;
use crate::error::{NatGuardError, Result};
use crate::event::InstanceState;

#[derive(Clone)]
pub struct HttpComputeClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DescribeInstanceResponse {
    state: InstanceState,
}

impl HttpComputeClient {
    pub fn new(config: &ComputeConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = Client::builder()
            .user_agent("natguard/0.1")
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                NatGuardError::Other(anyhow!("failed to build compute HTTP client: {e}"))
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn action_error(
        action: &'static str,
        instance_id: &str,
        source: impl Into<anyhow::Error>,
    ) -> NatGuardError {
        NatGuardError::Action {
            action,
            instance_id: instance_id.to_string(),
            source: source.into(),
        }
    }

    async fn post_command(&self, action: &'static str, instance_id: &str) -> Result<()> {
        let url = format!("{}/v1/instances/{}/{}", self.base_url, instance_id, action);
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| Self::action_error(action, instance_id, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(Self::action_error(
                action,
                instance_id,
                anyhow!("HTTP {status}: {body}"),
            ))
        }
    }
}

#[async_trait]
impl InstanceProbe for HttpComputeClient {
    async fn lifecycle_state(&self, instance_id: &str) -> Result<InstanceState> {
        let url = format!("{}/v1/instances/{}", self.base_url, instance_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::action_error("describe-instance", instance_id, e))?
            .error_for_status()
            .map_err(|e| Self::action_error("describe-instance", instance_id, e))?;

        let described: DescribeInstanceResponse = response
            .json()
            .await
            .map_err(|e| Self::action_error("describe-instance", instance_id, e))?;
        Ok(described.state)
    }

    async fn health_checks(&self, instance_id: &str) -> Result<Option<HealthChecks>> {
        let url = format!("{}/v1/instances/{}/status", self.base_url, instance_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::action_error("describe-status", instance_id, e))?;

        // The status API reports nothing for unknown or just-launched
        // instances; that is data for the policy, not a failure.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| Self::action_error("describe-status", instance_id, e))?;

        let checks: HealthChecks = response
            .json()
            .await
            .map_err(|e| Self::action_error("describe-status", instance_id, e))?;
        Ok(Some(checks))
    }
}

#[async_trait]
impl InstanceActions for HttpComputeClient {
    async fn start(&self, instance_id: &str) -> Result<()> {
        self.post_command("start", instance_id).await
    }

    async fn reboot(&self, instance_id: &str) -> Result<()> {
        self.post_command("reboot", instance_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let config = ComputeConfig {
            base_url: "http://compute.internal:8700/".to_string(),
            timeout_ms: 1000,
        };
        let client = HttpComputeClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://compute.internal:8700");
    }
}
