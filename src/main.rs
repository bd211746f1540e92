use clap::{Parser, Subcommand};
use natguard::adapters::{HttpComputeClient, WebhookNotifier};
use natguard::config::{LoggingConfig, RecoveryConfig};
use natguard::error::Result;
use natguard::handler::InvocationHandler;
use natguard::router;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "natguard", about = "Automated recovery controller for a single NAT instance")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config", env = "NATGUARD_CONFIG_DIR")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one event (JSON from a file, or stdin when omitted)
    Handle {
        /// Path to the event envelope JSON
        event: Option<PathBuf>,
    },
    /// Classify an event and print the routing outcome, no side effects
    Classify {
        /// Path to the event envelope JSON
        event: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RecoveryConfig::load_from(&cli.config_dir)?;
    init_logging(&config.logging);

    match &cli.command {
        Commands::Handle { event } => {
            let raw_event = read_event(event.as_deref())?;

            let compute = Arc::new(HttpComputeClient::new(&config.compute)?);
            let notifier = Arc::new(WebhookNotifier::new(config.notifier.webhook_url.clone()));
            let handler =
                InvocationHandler::new(config, compute.clone(), compute, notifier);

            let result = handler.invoke(&raw_event).await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if result.status_code == 500 {
                std::process::exit(1);
            }
        }

        Commands::Classify { event } => {
            let raw_event = read_event(event.as_deref())?;
            let envelope = serde_json::from_value(raw_event)?;
            let classified = router::classify(&envelope)?;
            println!("{classified:#?}");
        }
    }

    Ok(())
}

fn read_event(path: Option<&Path>) -> Result<serde_json::Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,natguard={}", config.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
