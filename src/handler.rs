//! Invocation entry point
//!
//! The single error boundary. Everything the router or engine raises is
//! converted here into an `InvocationResult`; fatal failures additionally
//! produce one escalation, unless an inner handler already sent one for
//! the same failure.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::compute::{InstanceActions, InstanceProbe};
use crate::config::RecoveryConfig;
use crate::engine::RecoveryEngine;
use crate::error::{NatGuardError, Result};
use crate::event::EventEnvelope;
use crate::notify::{send_best_effort, Alert, Notify};
use crate::result::InvocationResult;
use crate::router;

pub struct InvocationHandler {
    config: RecoveryConfig,
    engine: RecoveryEngine,
    notifier: Arc<dyn Notify>,
}

impl InvocationHandler {
    pub fn new(
        config: RecoveryConfig,
        probe: Arc<dyn InstanceProbe>,
        actions: Arc<dyn InstanceActions>,
        notifier: Arc<dyn Notify>,
    ) -> Self {
        let engine = RecoveryEngine::new(config.clone(), probe, actions, Arc::clone(&notifier));
        Self {
            config,
            engine,
            notifier,
        }
    }

    /// Run one invocation to completion. Never panics or raises: every
    /// failure becomes a structured result.
    pub async fn invoke(&self, raw_event: &Value) -> InvocationResult {
        let invocation_id = Uuid::new_v4();
        info!(%invocation_id, event = %raw_event, "Received event");

        match self.try_invoke(raw_event).await {
            Ok(result) => {
                info!(%invocation_id, status = result.status_code, "Invocation complete");
                result
            }
            Err(e) => {
                let status = e.status_code();
                if e.is_fatal() {
                    error!(%invocation_id, "Error processing event: {}", e);
                    if !e.already_escalated() {
                        let alert = Alert::controller_error(&e.to_string());
                        send_best_effort(
                            self.notifier.as_ref(),
                            &self.config.notify_channel,
                            &alert,
                        )
                        .await;
                    }
                } else {
                    info!(%invocation_id, status, "Invocation ended without action: {}", e);
                }
                InvocationResult::with_status(status, failure_body(&e))
            }
        }
    }

    async fn try_invoke(&self, raw_event: &Value) -> Result<InvocationResult> {
        // Fail fast on an incomplete deployment before touching anything.
        self.config
            .validate()
            .map_err(NatGuardError::IncompleteConfig)?;

        let envelope: EventEnvelope = serde_json::from_value(raw_event.clone())?;
        let event = router::classify(&envelope)?;
        self.engine.handle(&event).await
    }
}

fn failure_body(e: &NatGuardError) -> String {
    match e {
        NatGuardError::StateConflict { state, .. } => format!("Instance in {state} state"),
        NatGuardError::StatusNotFound { .. } => "Instance status not found".to_string(),
        _ => format!("Error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InstanceState;

    #[test]
    fn test_failure_bodies_match_status_semantics() {
        let conflict = NatGuardError::StateConflict {
            instance_id: "i-abc".to_string(),
            state: InstanceState::Running,
        };
        assert_eq!(failure_body(&conflict), "Instance in running state");
        assert_eq!(conflict.status_code(), 400);

        let missing = NatGuardError::StatusNotFound {
            instance_id: "i-abc".to_string(),
        };
        assert_eq!(failure_body(&missing), "Instance status not found");
        assert_eq!(missing.status_code(), 404);

        let config = NatGuardError::IncompleteConfig(vec!["instance_id must be set".to_string()]);
        assert!(failure_body(&config).starts_with("Error: "));
        assert_eq!(config.status_code(), 500);
    }
}
