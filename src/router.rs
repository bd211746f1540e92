//! Event routing
//!
//! Maps the raw envelope onto a [`RecoveryEvent`] by source and detail
//! type. Anything outside the two recognized shapes classifies as
//! `Unrecognized`, which the policy treats as a terminal no-op.

use tracing::warn;

use crate::error::Result;
use crate::event::{AlarmDetail, EventEnvelope, InstanceStateDetail, RecoveryEvent};

/// Source emitting instance lifecycle transitions.
pub const COMPUTE_SOURCE: &str = "aws.ec2";
/// Detail type of a lifecycle transition.
pub const STATE_CHANGE_DETAIL_TYPE: &str = "EC2 Instance State-change Notification";
/// Source emitting monitoring alarms.
pub const MONITORING_SOURCE: &str = "aws.cloudwatch";

/// Classify one envelope into a recovery event.
///
/// Fails only when a recognized envelope carries a malformed detail
/// payload; unknown sources never fail, they classify as `Unrecognized`.
pub fn classify(envelope: &EventEnvelope) -> Result<RecoveryEvent> {
    if envelope.source == COMPUTE_SOURCE && envelope.detail_type == STATE_CHANGE_DETAIL_TYPE {
        let detail: InstanceStateDetail = serde_json::from_value(envelope.detail.clone())?;
        return Ok(RecoveryEvent::InstanceStateChange {
            instance_id: detail.instance_id,
            state: detail.state,
        });
    }

    if envelope.source == MONITORING_SOURCE {
        let detail: AlarmDetail = serde_json::from_value(envelope.detail.clone())?;
        return Ok(RecoveryEvent::AlarmStateChange {
            alarm_name: detail.alarm_name,
            state: detail.new_state.value,
            reason: detail.new_state.reason,
        });
    }

    warn!(
        source = %envelope.source,
        detail_type = %envelope.detail_type,
        "Unhandled event type"
    );
    Ok(RecoveryEvent::Unrecognized {
        source: envelope.source.clone(),
        detail_type: envelope.detail_type.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AlarmState, InstanceState};
    use serde_json::json;

    fn envelope(source: &str, detail_type: &str, detail: serde_json::Value) -> EventEnvelope {
        serde_json::from_value(json!({
            "source": source,
            "detail-type": detail_type,
            "detail": detail,
        }))
        .unwrap()
    }

    #[test]
    fn test_classifies_instance_state_change() {
        let envelope = envelope(
            COMPUTE_SOURCE,
            STATE_CHANGE_DETAIL_TYPE,
            json!({"instance-id": "i-abc", "state": "stopped"}),
        );
        match classify(&envelope).unwrap() {
            RecoveryEvent::InstanceStateChange { instance_id, state } => {
                assert_eq!(instance_id, "i-abc");
                assert_eq!(state, InstanceState::Stopped);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_compute_source_with_other_detail_type_is_unrecognized() {
        let envelope = envelope(COMPUTE_SOURCE, "EBS Volume Notification", json!({}));
        assert!(matches!(
            classify(&envelope).unwrap(),
            RecoveryEvent::Unrecognized { .. }
        ));
    }

    #[test]
    fn test_classifies_alarm_regardless_of_detail_type() {
        let envelope = envelope(
            MONITORING_SOURCE,
            "CloudWatch Alarm State Change",
            json!({
                "alarmName": "nat-health",
                "newState": {"value": "ALARM", "reason": "threshold"}
            }),
        );
        match classify(&envelope).unwrap() {
            RecoveryEvent::AlarmStateChange {
                alarm_name,
                state,
                reason,
            } => {
                assert_eq!(alarm_name, "nat-health");
                assert_eq!(state, AlarmState::Alarm);
                assert_eq!(reason, "threshold");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_source_is_unrecognized() {
        let envelope = envelope("aws.s3", "Object Created", json!({}));
        assert!(matches!(
            classify(&envelope).unwrap(),
            RecoveryEvent::Unrecognized { .. }
        ));
    }

    #[test]
    fn test_malformed_instance_detail_is_an_error() {
        let envelope = envelope(COMPUTE_SOURCE, STATE_CHANGE_DETAIL_TYPE, json!({"state": 7}));
        assert!(classify(&envelope).is_err());
    }
}
