use thiserror::Error;

use crate::event::InstanceState;

/// Main error type for the recovery controller
#[derive(Error, Debug)]
pub enum NatGuardError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Incomplete configuration: {}", .0.join("; "))]
    IncompleteConfig(Vec<String>),

    // External control-plane call failed (start/reboot/describe)
    #[error("Compute action '{action}' failed for {instance_id}: {source}")]
    Action {
        action: &'static str,
        instance_id: String,
        #[source]
        source: anyhow::Error,
    },

    // Health query returned no data for the instance
    #[error("No status found for instance {instance_id}")]
    StatusNotFound { instance_id: String },

    // Instance not in the state the requested action expects
    #[error("Instance {instance_id} is in {state} state")]
    StateConflict {
        instance_id: String,
        state: InstanceState,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl NatGuardError {
    /// HTTP-like status code this error maps to in the invocation result.
    pub fn status_code(&self) -> u16 {
        match self {
            NatGuardError::StateConflict { .. } => 400,
            NatGuardError::StatusNotFound { .. } => 404,
            _ => 500,
        }
    }

    /// Whether an inner handler already sent a failure escalation for this
    /// error. The entry point only sends its generic alert when this is
    /// false, so every failure produces exactly one notification.
    pub fn already_escalated(&self) -> bool {
        matches!(self, NatGuardError::Action { .. })
    }

    /// Non-fatal outcomes (400/404) are reported in the result body without
    /// any escalation.
    pub fn is_fatal(&self) -> bool {
        self.status_code() == 500
    }
}

/// Result type alias for NatGuardError
pub type Result<T> = std::result::Result<T, NatGuardError>;
