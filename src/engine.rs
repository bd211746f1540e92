//! Recovery engine
//!
//! Sequences one invocation: fetch the snapshot the event's branch needs,
//! run the pure policy, carry out the decided action, notify. Clients are
//! injected so the whole engine runs against test doubles.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::compute::{InstanceActions, InstanceProbe, StatusSnapshot};
use crate::config::RecoveryConfig;
use crate::decision::{decide, Decision, NoActionReason};
use crate::error::{NatGuardError, Result};
use crate::event::RecoveryEvent;
use crate::notify::{send_best_effort, Alert, Notify};
use crate::result::InvocationResult;

pub struct RecoveryEngine {
    config: RecoveryConfig,
    probe: Arc<dyn InstanceProbe>,
    actions: Arc<dyn InstanceActions>,
    notifier: Arc<dyn Notify>,
}

impl RecoveryEngine {
    pub fn new(
        config: RecoveryConfig,
        probe: Arc<dyn InstanceProbe>,
        actions: Arc<dyn InstanceActions>,
        notifier: Arc<dyn Notify>,
    ) -> Self {
        Self {
            config,
            probe,
            actions,
            notifier,
        }
    }

    /// Process one classified event to completion.
    pub async fn handle(&self, event: &RecoveryEvent) -> Result<InvocationResult> {
        let snapshot = self.snapshot_for(event).await?;
        let decision = decide(event, &self.config.instance_id, &snapshot);
        info!(?decision, "Policy decision");
        self.execute(event, decision).await
    }

    /// Fetch the live state the policy needs for this event. Only the
    /// branch that will be consulted is probed; nothing is cached.
    async fn snapshot_for(&self, event: &RecoveryEvent) -> Result<StatusSnapshot> {
        let id = &self.config.instance_id;

        match event {
            RecoveryEvent::InstanceStateChange {
                instance_id, state, ..
            } if instance_id == id && state.is_stop_transition() => {
                let live = self.escalating(self.probe.lifecycle_state(id).await).await?;
                info!(instance_id = %id, %live, "Probed live lifecycle state");
                Ok(StatusSnapshot::with_lifecycle(live))
            }

            RecoveryEvent::AlarmStateChange { alarm_name, state, .. }
                if *state == crate::event::AlarmState::Alarm
                    && crate::decision::is_health_alarm(alarm_name) =>
            {
                let health = self.escalating(self.probe.health_checks(id).await).await?;
                if let Some(checks) = health {
                    info!(
                        instance_status = %checks.instance_status,
                        system_status = %checks.system_status,
                        "Probed health checks"
                    );
                }
                Ok(StatusSnapshot::with_health(health))
            }

            _ => Ok(StatusSnapshot::default()),
        }
    }

    async fn execute(&self, event: &RecoveryEvent, decision: Decision) -> Result<InvocationResult> {
        let id = self.config.instance_id.clone();

        match decision {
            Decision::NoAction(reason) => Ok(self.no_action_result(event, reason)),

            Decision::Start => {
                info!(instance_id = %id, "Attempting to start stopped NAT instance");
                self.escalating(self.actions.start(&id).await).await?;
                self.notify(&Alert::instance_restarted(&id)).await;
                Ok(InvocationResult::ok(format!(
                    "Successfully started instance {id}"
                )))
            }

            Decision::Conflict(live) => {
                warn!(instance_id = %id, state = %live, "Instance not in stopped state, cannot start");
                Err(NatGuardError::StateConflict {
                    instance_id: id,
                    state: live,
                })
            }

            Decision::EscalateTerminated => {
                error!(instance_id = %id, "NAT instance has been terminated");
                self.notify(&Alert::instance_terminated(&id)).await;
                Ok(InvocationResult::ok(
                    "Critical alert sent for terminated instance",
                ))
            }

            Decision::EscalateAlarm => {
                let (alarm_name, state, reason) = alarm_context(event);
                self.notify(&Alert::alarm_notice(&id, alarm_name, state, reason))
                    .await;
                Ok(InvocationResult::ok(format!("Processed alarm: {alarm_name}")))
            }

            Decision::Reboot => {
                let (alarm_name, _, reason) = alarm_context(event);
                info!(instance_id = %id, alarm = %alarm_name, "Attempting to reboot instance");
                self.escalating(self.actions.reboot(&id).await).await?;
                self.notify(&Alert::instance_rebooted(&id, alarm_name, reason))
                    .await;
                Ok(InvocationResult::ok(format!(
                    "Successfully rebooted instance {id}"
                )))
            }

            Decision::StatusUnavailable => {
                error!(instance_id = %id, "No instance status found");
                Err(NatGuardError::StatusNotFound { instance_id: id })
            }
        }
    }

    fn no_action_result(&self, event: &RecoveryEvent, reason: NoActionReason) -> InvocationResult {
        match reason {
            NoActionReason::UnrecognizedEvent => InvocationResult::ok("Event type not handled"),
            NoActionReason::ForeignInstance => {
                if let RecoveryEvent::InstanceStateChange { instance_id, .. } = event {
                    info!(%instance_id, "State change for different instance");
                }
                InvocationResult::ok("Not our instance")
            }
            NoActionReason::BenignState(state) => {
                info!(state = %state, "No action needed for state");
                InvocationResult::ok("No action needed")
            }
            NoActionReason::AlarmNotActionable(state) => {
                let (alarm_name, ..) = alarm_context(event);
                info!(alarm = %alarm_name, state = %state, "Alarm not in ALARM state");
                InvocationResult::ok(format!("Processed alarm: {alarm_name}"))
            }
            NoActionReason::ChecksHealthy => {
                info!("Status checks are OK, no reboot needed");
                InvocationResult::ok("Status checks OK, no action needed")
            }
        }
    }

    /// Escalate a failed probe or corrective call, then let the error
    /// propagate. The entry point knows not to alert a second time.
    async fn escalating<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                let id = &self.config.instance_id;
                error!(instance_id = %id, "Recovery step failed: {}", e);
                self.notify(&Alert::recovery_failed(id, &e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn notify(&self, alert: &Alert) {
        send_best_effort(self.notifier.as_ref(), &self.config.notify_channel, alert).await;
    }
}

fn alarm_context(event: &RecoveryEvent) -> (&str, &str, &str) {
    match event {
        RecoveryEvent::AlarmStateChange {
            alarm_name,
            state,
            reason,
        } => (alarm_name.as_str(), state.as_str(), reason.as_str()),
        _ => ("Unknown", "Unknown", "No reason provided"),
    }
}
