//! Recovery policy
//!
//! The whole state-transition table lives in one pure function over the
//! classified event and a live status snapshot, so the policy is unit
//! testable without touching the control plane. The engine's job is only
//! to fetch the snapshot and carry out whatever this module decides.

use crate::compute::StatusSnapshot;
use crate::event::{AlarmState, InstanceState, RecoveryEvent};

/// Why the controller chose to do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoActionReason {
    /// Event source/type is not one we handle
    UnrecognizedEvent,
    /// State change for an instance we do not own
    ForeignInstance,
    /// Lifecycle state requires no intervention
    BenignState(InstanceState),
    /// Alarm is not in the ALARM state
    AlarmNotActionable(AlarmState),
    /// Health checks probed clean
    ChecksHealthy,
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Do nothing, report success
    NoAction(NoActionReason),
    /// Issue a start against the instance and send a recovery notice
    Start,
    /// Live state does not match the stopped report; refuse to act
    Conflict(InstanceState),
    /// Instance is gone; send a critical escalation, nothing to correct
    EscalateTerminated,
    /// Alarm fired but is not a recovery trigger; escalate for a human
    EscalateAlarm,
    /// Health checks failing; issue a reboot and send a recovery notice
    Reboot,
    /// Status API has no data for the instance; refuse to act
    StatusUnavailable,
}

/// Heuristic alarm classification: alarms whose name mentions health or
/// status checks are recovery triggers, everything else is advisory.
/// Case-insensitive substring match, kept deliberately simple.
pub fn is_health_alarm(alarm_name: &str) -> bool {
    let name = alarm_name.to_lowercase();
    name.contains("health") || name.contains("status")
}

/// Evaluate the policy table for one event against the live snapshot.
///
/// The snapshot only needs the fields the event's branch consults: the
/// stop path reads `lifecycle`, the health path reads `health`. A missing
/// `lifecycle` on the stop path is treated as a conflict with unknown
/// state rather than a reason to start blind.
pub fn decide(event: &RecoveryEvent, target_instance_id: &str, snapshot: &StatusSnapshot) -> Decision {
    match event {
        RecoveryEvent::Unrecognized { .. } => {
            Decision::NoAction(NoActionReason::UnrecognizedEvent)
        }

        RecoveryEvent::InstanceStateChange { instance_id, state } => {
            if instance_id != target_instance_id {
                return Decision::NoAction(NoActionReason::ForeignInstance);
            }

            if state.is_stop_transition() {
                // Re-check live state so we do not race a concurrent
                // manual restart: only a confirmed stop gets a start.
                match snapshot.lifecycle {
                    Some(InstanceState::Stopped) => Decision::Start,
                    Some(live) => Decision::Conflict(live),
                    None => Decision::Conflict(InstanceState::Unknown),
                }
            } else if state.is_terminal() {
                Decision::EscalateTerminated
            } else {
                Decision::NoAction(NoActionReason::BenignState(*state))
            }
        }

        RecoveryEvent::AlarmStateChange {
            alarm_name, state, ..
        } => {
            if *state != AlarmState::Alarm {
                return Decision::NoAction(NoActionReason::AlarmNotActionable(*state));
            }

            if !is_health_alarm(alarm_name) {
                return Decision::EscalateAlarm;
            }

            match snapshot.health {
                None => Decision::StatusUnavailable,
                Some(checks) if checks.all_ok() => {
                    Decision::NoAction(NoActionReason::ChecksHealthy)
                }
                Some(_) => Decision::Reboot,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{HealthChecks, HealthStatus};

    const TARGET: &str = "i-1234567890abcdef0";

    fn state_event(instance_id: &str, state: InstanceState) -> RecoveryEvent {
        RecoveryEvent::InstanceStateChange {
            instance_id: instance_id.to_string(),
            state,
        }
    }

    fn alarm_event(name: &str, state: AlarmState) -> RecoveryEvent {
        RecoveryEvent::AlarmStateChange {
            alarm_name: name.to_string(),
            state,
            reason: "test".to_string(),
        }
    }

    fn checks(instance: HealthStatus, system: HealthStatus) -> StatusSnapshot {
        StatusSnapshot::with_health(Some(HealthChecks {
            instance_status: instance,
            system_status: system,
        }))
    }

    #[test]
    fn test_unrecognized_event_is_ignored() {
        let event = RecoveryEvent::Unrecognized {
            source: "aws.s3".to_string(),
            detail_type: "whatever".to_string(),
        };
        assert_eq!(
            decide(&event, TARGET, &StatusSnapshot::default()),
            Decision::NoAction(NoActionReason::UnrecognizedEvent)
        );
    }

    #[test]
    fn test_foreign_instance_is_filtered() {
        let event = state_event("i-feedfacefeedface0", InstanceState::Stopped);
        assert_eq!(
            decide(&event, TARGET, &StatusSnapshot::default()),
            Decision::NoAction(NoActionReason::ForeignInstance)
        );
    }

    #[test]
    fn test_stopped_with_confirmed_stop_starts() {
        let event = state_event(TARGET, InstanceState::Stopped);
        let snapshot = StatusSnapshot::with_lifecycle(InstanceState::Stopped);
        assert_eq!(decide(&event, TARGET, &snapshot), Decision::Start);
    }

    #[test]
    fn test_stopping_event_also_starts_once_stop_confirmed() {
        let event = state_event(TARGET, InstanceState::Stopping);
        let snapshot = StatusSnapshot::with_lifecycle(InstanceState::Stopped);
        assert_eq!(decide(&event, TARGET, &snapshot), Decision::Start);
    }

    #[test]
    fn test_stopped_event_but_live_running_conflicts() {
        let event = state_event(TARGET, InstanceState::Stopped);
        let snapshot = StatusSnapshot::with_lifecycle(InstanceState::Running);
        assert_eq!(
            decide(&event, TARGET, &snapshot),
            Decision::Conflict(InstanceState::Running)
        );
    }

    #[test]
    fn test_stopped_event_with_no_live_state_conflicts() {
        let event = state_event(TARGET, InstanceState::Stopped);
        assert_eq!(
            decide(&event, TARGET, &StatusSnapshot::default()),
            Decision::Conflict(InstanceState::Unknown)
        );
    }

    #[test]
    fn test_terminated_escalates_without_action() {
        for state in [InstanceState::Terminated, InstanceState::Terminating] {
            let event = state_event(TARGET, state);
            assert_eq!(
                decide(&event, TARGET, &StatusSnapshot::default()),
                Decision::EscalateTerminated
            );
        }
    }

    #[test]
    fn test_benign_states_need_nothing() {
        for state in [
            InstanceState::Pending,
            InstanceState::Running,
            InstanceState::ShuttingDown,
            InstanceState::Unknown,
        ] {
            let event = state_event(TARGET, state);
            assert_eq!(
                decide(&event, TARGET, &StatusSnapshot::default()),
                Decision::NoAction(NoActionReason::BenignState(state))
            );
        }
    }

    #[test]
    fn test_non_alarm_states_are_ignored() {
        for state in [AlarmState::Ok, AlarmState::InsufficientData] {
            let event = alarm_event("nat-health-check", state);
            assert_eq!(
                decide(&event, TARGET, &StatusSnapshot::default()),
                Decision::NoAction(NoActionReason::AlarmNotActionable(state))
            );
        }
    }

    #[test]
    fn test_non_health_alarm_escalates_only() {
        let event = alarm_event("nat-billing-anomaly", AlarmState::Alarm);
        assert_eq!(
            decide(&event, TARGET, &StatusSnapshot::default()),
            Decision::EscalateAlarm
        );
    }

    #[test]
    fn test_health_alarm_with_clean_checks_does_nothing() {
        let event = alarm_event("NAT-Health-Check", AlarmState::Alarm);
        let snapshot = checks(HealthStatus::Ok, HealthStatus::Ok);
        assert_eq!(
            decide(&event, TARGET, &snapshot),
            Decision::NoAction(NoActionReason::ChecksHealthy)
        );
    }

    #[test]
    fn test_health_alarm_with_failing_system_check_reboots() {
        let event = alarm_event("nat-status-check", AlarmState::Alarm);
        let snapshot = checks(HealthStatus::Ok, HealthStatus::Impaired);
        assert_eq!(decide(&event, TARGET, &snapshot), Decision::Reboot);
    }

    #[test]
    fn test_health_alarm_with_failing_instance_check_reboots() {
        let event = alarm_event("nat-health", AlarmState::Alarm);
        let snapshot = checks(HealthStatus::Impaired, HealthStatus::Ok);
        assert_eq!(decide(&event, TARGET, &snapshot), Decision::Reboot);
    }

    #[test]
    fn test_health_alarm_without_status_data_refuses() {
        let event = alarm_event("nat-health", AlarmState::Alarm);
        let snapshot = StatusSnapshot::with_health(None);
        assert_eq!(decide(&event, TARGET, &snapshot), Decision::StatusUnavailable);
    }

    #[test]
    fn test_is_health_alarm_matches_substrings_case_insensitive() {
        assert!(is_health_alarm("nat-health-check-failed"));
        assert!(is_health_alarm("NAT-STATUS-CHECK"));
        assert!(is_health_alarm("InstanceHealthLow"));
        assert!(!is_health_alarm("nat-cpu-credit-balance"));
        assert!(!is_health_alarm(""));
    }
}
