//! bridge-pinger binary
//!
//! Requires PRIVATE_KEY and OPT_SEPOLIA_RPC_URL (a `.env` file is read if present).
//! Set TX_INPUT_DATA to the bridge calldata; without it transfers carry none.

use bridge_pinger::{driver, Config, DriveSettings};
use eyre::Context;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "bridge_pinger=info".into()),
        )
        .init();

    let (config, settings) = match load() {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(2);
        }
    };
    tracing::info!(rpc_url = %config.rpc_url(), key = %config.masked_secret(), "Configuration loaded");

    let outcome = driver::run(&config, &settings).await;
    if outcome.is_error() {
        tracing::error!(code = outcome.exit_code(), "Exiting after failure");
    } else {
        tracing::info!("Exiting: balance at or below threshold");
    }
    ExitCode::from(outcome.exit_code())
}

fn load() -> eyre::Result<(Config, DriveSettings)> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let settings = DriveSettings::from_env().context("Failed to load drive settings")?;
    Ok((config, settings))
}
