//! Ferry Submit - one-shot program call driver
//!
//! Loads configuration, submits a single method call to the configured
//! endpoint, and prints the resulting transaction signature.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use ferry::connection::HttpConnector;
use ferry::logging;
use ferry::{CallDescription, ConnectionManager, SubmissionCoordinator, SubmitterConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit one program call and await confirmation", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "ferry.toml")]
    config: String,

    /// Target program id (base58)
    #[arg(short, long, env = "FERRY_PROGRAM_ID")]
    program: String,

    /// Method to invoke
    #[arg(short, long, default_value = "initialize")]
    method: String,

    /// Override the configured endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose, args.json_logs)?;

    let mut config = load_config(&args.config)?;
    if let Some(url) = args.endpoint {
        config.endpoint_url = url;
    }
    config.validate().context("invalid configuration")?;

    info!(
        endpoint = %config.endpoint_url,
        network = %config.network,
        program = %args.program,
        method = %args.method,
        "Submitting program call"
    );

    let manager = ConnectionManager::new(config.endpoint(), Arc::new(HttpConnector::default()));
    let coordinator = SubmissionCoordinator::new(manager, config.policy());

    let call = CallDescription::no_args(args.program, args.method);
    let receipt = coordinator
        .submit(&call)
        .await
        .context("submission did not confirm")?;

    println!("Transaction signature: {}", receipt.tx_id);
    if let Some(slot) = receipt.slot {
        println!("Confirmed at slot {}", slot);
    }

    Ok(())
}

/// Load configuration from file, falling back to the environment
fn load_config(path: &str) -> Result<SubmitterConfig> {
    if std::path::Path::new(path).exists() {
        SubmitterConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, reading environment", path);
        SubmitterConfig::from_env().context("no config file and incomplete environment")
    }
}
