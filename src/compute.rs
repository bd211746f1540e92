//! Ports to the compute control plane
//!
//! The controller only ever needs four calls against the instance API:
//! describe lifecycle state, describe health checks, start, reboot. The
//! two traits split read from write so tests can count them separately.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::event::InstanceState;

/// Pass/fail signal from a platform health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthStatus {
    Ok,
    Impaired,
    InsufficientData,
    NotApplicable,
    Initializing,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Impaired => "impaired",
            HealthStatus::InsufficientData => "insufficient-data",
            HealthStatus::NotApplicable => "not-applicable",
            HealthStatus::Initializing => "initializing",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Guest-level and host-level check results for one instance.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HealthChecks {
    pub instance_status: HealthStatus,
    pub system_status: HealthStatus,
}

impl HealthChecks {
    pub fn all_ok(&self) -> bool {
        self.instance_status.is_ok() && self.system_status.is_ok()
    }
}

/// Live view of the instance, fetched fresh per decision and never cached.
/// Only the fields the current branch needs are populated.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSnapshot {
    pub lifecycle: Option<InstanceState>,
    pub health: Option<HealthChecks>,
}

impl StatusSnapshot {
    pub fn with_lifecycle(state: InstanceState) -> Self {
        Self {
            lifecycle: Some(state),
            health: None,
        }
    }

    pub fn with_health(health: Option<HealthChecks>) -> Self {
        Self {
            lifecycle: None,
            health,
        }
    }
}

/// Read-only queries against the control plane.
#[async_trait]
pub trait InstanceProbe: Send + Sync {
    /// Current lifecycle state of the instance.
    async fn lifecycle_state(&self, instance_id: &str) -> Result<InstanceState>;

    /// Health-check results, or `None` when the status API has no entry
    /// for the instance.
    async fn health_checks(&self, instance_id: &str) -> Result<Option<HealthChecks>>;
}

/// Corrective commands against the control plane. Each is a single
/// best-effort call; retries are the platform's concern, not ours.
#[async_trait]
pub trait InstanceActions: Send + Sync {
    async fn start(&self, instance_id: &str) -> Result<()>;

    async fn reboot(&self, instance_id: &str) -> Result<()>;
}
