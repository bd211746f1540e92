//! Webhook alert delivery
//!
//! Posts alerts as JSON to a configured webhook endpoint. Callers go
//! through [`crate::notify::send_best_effort`], so a dead endpoint only
//! ever costs a log line.

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NatGuardError, Result};
use crate::notify::{Alert, Notify};

/// Webhook notification client
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    channel: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[derive(Deserialize, Default)]
struct WebhookResponse {
    #[serde(default)]
    message_id: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn send(&self, channel: &str, alert: &Alert) -> Result<String> {
        if self.webhook_url.is_empty() {
            return Err(NatGuardError::Other(anyhow!(
                "no webhook URL configured, alert '{}' not delivered",
                alert.subject
            )));
        }

        let message = WebhookMessage {
            channel,
            subject: &alert.subject,
            body: &alert.body,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| NatGuardError::Other(anyhow!("webhook request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NatGuardError::Other(anyhow!(
                "webhook rejected alert: HTTP {status}: {body}"
            )));
        }

        let parsed: WebhookResponse = response.json().await.unwrap_or_default();
        let message_id = parsed.message_id.unwrap_or_else(|| "accepted".to_string());
        debug!(%message_id, "Webhook alert delivered");
        Ok(message_id)
    }
}
