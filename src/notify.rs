//! Alerting
//!
//! Alerts are write-once subject/body pairs, fire-and-forget. Delivery
//! failure is logged and swallowed so a broken notification channel can
//! never mask the outcome of a recovery action.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::error::Result;

/// Human-readable alert payload
#[derive(Debug, Clone)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

impl Alert {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Routine notice: stopped instance was started again.
    pub fn instance_restarted(instance_id: &str) -> Self {
        Self::new(
            "NAT Instance Automatically Restarted",
            format!(
                "NAT Instance Recovery Action\n\n\
                 Instance ID: {}\n\
                 Action: Started stopped instance\n\
                 Time: {}\n\
                 Status: Success\n\n\
                 The NAT instance was automatically restarted to maintain network connectivity.\n\
                 Please monitor the instance and verify connectivity from private subnets.",
                instance_id,
                Utc::now().to_rfc3339(),
            ),
        )
    }

    /// Critical escalation: the instance is gone and needs manual rebuild.
    pub fn instance_terminated(instance_id: &str) -> Self {
        Self::new(
            "CRITICAL: NAT Instance Terminated",
            format!(
                "CRITICAL: NAT Instance Terminated\n\n\
                 Instance ID: {}\n\
                 Action: Instance terminated\n\
                 Time: {}\n\
                 Impact: Private subnet connectivity lost\n\n\
                 IMMEDIATE ACTION REQUIRED:\n\
                 1. Launch new NAT instance or enable Auto Scaling Group\n\
                 2. Update route tables to point to new instance\n\
                 3. Verify connectivity from private subnets\n\n\
                 This is a critical infrastructure failure requiring immediate attention.",
                instance_id,
                Utc::now().to_rfc3339(),
            ),
        )
    }

    /// Routine notice: degraded instance was rebooted.
    pub fn instance_rebooted(instance_id: &str, alarm_name: &str, reason: &str) -> Self {
        Self::new(
            "NAT Instance Automatically Rebooted",
            format!(
                "NAT Instance Recovery Action\n\n\
                 Instance ID: {}\n\
                 Action: Rebooted due to health check failure\n\
                 Alarm: {}\n\
                 Reason: {}\n\
                 Time: {}\n\n\
                 The NAT instance was automatically rebooted to recover from health check failures.\n\
                 Please monitor the instance status and verify connectivity.",
                instance_id,
                alarm_name,
                reason,
                Utc::now().to_rfc3339(),
            ),
        )
    }

    /// Informational escalation for alarms that do not trigger recovery.
    pub fn alarm_notice(instance_id: &str, alarm_name: &str, state: &str, reason: &str) -> Self {
        Self::new(
            format!("NAT Instance Alert: {alarm_name}"),
            format!(
                "NAT Instance Alert\n\n\
                 Alarm: {}\n\
                 State: {}\n\
                 Reason: {}\n\
                 Instance: {}\n\
                 Time: {}\n\n\
                 Please investigate the issue and take appropriate action if needed.",
                alarm_name,
                state,
                reason,
                instance_id,
                Utc::now().to_rfc3339(),
            ),
        )
    }

    /// Escalation for a failed recovery action.
    pub fn recovery_failed(instance_id: &str, detail: &str) -> Self {
        Self::new(
            "NAT Recovery Failed",
            format!("Failed to recover NAT instance {instance_id}: {detail}"),
        )
    }

    /// Escalation from the top-level error boundary.
    pub fn controller_error(detail: &str) -> Self {
        Self::new(
            "NAT Recovery Error",
            format!("Error in recovery function: {detail}"),
        )
    }
}

/// Outbound notification channel
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver one alert to the channel, returning a delivery id.
    async fn send(&self, channel: &str, alert: &Alert) -> Result<String>;
}

/// Send an alert, logging the outcome either way. Errors stop here.
pub async fn send_best_effort(notifier: &dyn Notify, channel: &str, alert: &Alert) {
    match notifier.send(channel, alert).await {
        Ok(message_id) => info!(%message_id, subject = %alert.subject, "Alert sent"),
        Err(e) => error!(subject = %alert.subject, "Failed to send alert: {}", e),
    }
}
