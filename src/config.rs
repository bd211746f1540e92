use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryConfig {
    /// Identifier of the NAT instance this controller owns
    pub instance_id: String,
    /// Route table the instance serves. Not consulted by the recovery
    /// logic, but required so one config surface covers the deployment.
    pub route_table_id: String,
    /// Notification channel identifier alerts are addressed to
    pub notify_channel: String,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComputeConfig {
    /// Base URL of the compute control-plane API
    #[serde(default = "default_compute_url")]
    pub base_url: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            base_url: default_compute_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_compute_url() -> String {
    "http://localhost:8700".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotifierConfig {
    /// Webhook endpoint for alert delivery (empty = log-only)
    #[serde(default)]
    pub webhook_url: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RecoveryConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("instance_id", "")?
            .set_default("route_table_id", "")?
            .set_default("notify_channel", "")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("NATGUARD_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (NATGUARD_INSTANCE_ID, etc.)
            .add_source(
                Environment::with_prefix("NATGUARD")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    ///
    /// The three core identifiers must all be present; the controller
    /// refuses to run against a partially configured deployment.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.instance_id.trim().is_empty() {
            errors.push("instance_id must be set".to_string());
        }

        if self.route_table_id.trim().is_empty() {
            errors.push("route_table_id must be set".to_string());
        }

        if self.notify_channel.trim().is_empty() {
            errors.push("notify_channel must be set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
