pub mod adapters;
pub mod compute;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod event;
pub mod handler;
pub mod notify;
pub mod result;
pub mod router;

pub use adapters::{HttpComputeClient, WebhookNotifier};
pub use compute::{HealthChecks, HealthStatus, InstanceActions, InstanceProbe, StatusSnapshot};
pub use config::RecoveryConfig;
pub use decision::{decide, is_health_alarm, Decision, NoActionReason};
pub use engine::RecoveryEngine;
pub use error::{NatGuardError, Result};
pub use event::{AlarmState, EventEnvelope, InstanceState, RecoveryEvent};
pub use handler::InvocationHandler;
pub use notify::{Alert, Notify};
pub use result::InvocationResult;
