//! Inbound event model
//!
//! One envelope arrives per invocation. The envelope carries a `source`,
//! a `detail-type` and a free-form `detail` payload; the router decides
//! which of the two recognized detail shapes applies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw event envelope as delivered by the event bus.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(default)]
    pub source: String,
    #[serde(rename = "detail-type", default)]
    pub detail_type: String,
    #[serde(default)]
    pub detail: Value,
}

/// Coarse instance lifecycle state as reported by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Stopped,
    Stopping,
    Terminated,
    Terminating,
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Stopped => "stopped",
            InstanceState::Stopping => "stopping",
            InstanceState::Terminated => "terminated",
            InstanceState::Terminating => "terminating",
            InstanceState::Unknown => "unknown",
        }
    }

    /// States where the instance is down but recoverable with a start call.
    pub fn is_stop_transition(&self) -> bool {
        matches!(self, InstanceState::Stopped | InstanceState::Stopping)
    }

    /// States with no automated way back.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InstanceState::Terminated | InstanceState::Terminating)
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alarm state value from the monitoring service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
    #[serde(other)]
    Unknown,
}

impl AlarmState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmState::Ok => "OK",
            AlarmState::Alarm => "ALARM",
            AlarmState::InsufficientData => "INSUFFICIENT_DATA",
            AlarmState::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for AlarmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Instance state-change detail payload.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceStateDetail {
    #[serde(rename = "instance-id")]
    pub instance_id: String,
    pub state: InstanceState,
}

/// Alarm state-change detail payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AlarmDetail {
    #[serde(rename = "alarmName", default = "unknown_alarm")]
    pub alarm_name: String,
    #[serde(rename = "newState", default)]
    pub new_state: AlarmNewState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlarmNewState {
    #[serde(default = "unknown_value")]
    pub value: AlarmState,
    #[serde(default = "no_reason")]
    pub reason: String,
}

impl Default for AlarmNewState {
    fn default() -> Self {
        Self {
            value: AlarmState::Unknown,
            reason: no_reason(),
        }
    }
}

fn unknown_alarm() -> String {
    "Unknown".to_string()
}

fn unknown_value() -> AlarmState {
    AlarmState::Unknown
}

fn no_reason() -> String {
    "No reason provided".to_string()
}

/// Classified event, constructed once per invocation by the router.
#[derive(Debug, Clone)]
pub enum RecoveryEvent {
    InstanceStateChange {
        instance_id: String,
        state: InstanceState,
    },
    AlarmStateChange {
        alarm_name: String,
        state: AlarmState,
        reason: String,
    },
    Unrecognized {
        source: String,
        detail_type: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_parses_instance_state_change() {
        let raw = json!({
            "source": "aws.ec2",
            "detail-type": "EC2 Instance State-change Notification",
            "detail": {
                "instance-id": "i-1234567890abcdef0",
                "state": "stopped"
            }
        });
        let envelope: EventEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.source, "aws.ec2");

        let detail: InstanceStateDetail = serde_json::from_value(envelope.detail).unwrap();
        assert_eq!(detail.instance_id, "i-1234567890abcdef0");
        assert_eq!(detail.state, InstanceState::Stopped);
    }

    #[test]
    fn test_unknown_instance_state_does_not_fail_parsing() {
        let detail: InstanceStateDetail = serde_json::from_value(json!({
            "instance-id": "i-abc",
            "state": "rebooting"
        }))
        .unwrap();
        assert_eq!(detail.state, InstanceState::Unknown);
    }

    #[test]
    fn test_envelope_parses_alarm() {
        let detail: AlarmDetail = serde_json::from_value(json!({
            "alarmName": "nat-health-check-failed",
            "newState": {
                "value": "ALARM",
                "reason": "1 datapoint was below the threshold"
            }
        }))
        .unwrap();
        assert_eq!(detail.alarm_name, "nat-health-check-failed");
        assert_eq!(detail.new_state.value, AlarmState::Alarm);
    }

    #[test]
    fn test_alarm_detail_defaults() {
        let detail: AlarmDetail = serde_json::from_value(json!({})).unwrap();
        assert_eq!(detail.alarm_name, "Unknown");
        assert_eq!(detail.new_state.value, AlarmState::Unknown);
        assert_eq!(detail.new_state.reason, "No reason provided");
    }

    #[test]
    fn test_shutting_down_kebab_case() {
        let state: InstanceState = serde_json::from_value(json!("shutting-down")).unwrap();
        assert_eq!(state, InstanceState::ShuttingDown);
        assert!(!state.is_stop_transition());
        assert!(!state.is_terminal());
    }
}
