//! Concrete external collaborators
//!
//! - HTTP client for the compute control-plane API
//! - Webhook sender for alert delivery

pub mod http_compute;
pub mod webhook;

pub use http_compute::HttpComputeClient;
pub use webhook::WebhookNotifier;
