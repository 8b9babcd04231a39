//! Drive loop: check balance, submit, report, sleep, repeat
//!
//! ```text
//! Idle -> Checking -> (Submitting -> Reporting -> Waiting -> Checking)* -> Halted
//! ```
//!
//! Every network call and the sleep between cycles is awaited before the next
//! step starts, so cycle N's confirmation always lands before cycle N+1
//! fetches its nonce.

use crate::config::Config;
use crate::constants::{
    scale_ether, BALANCE_THRESHOLD, BRIDGE_CONTRACT, CYCLE_INTERVAL, DEFAULT_EXPLORER_URL,
    TRANSFER_AMOUNT,
};
use crate::error::{ConfigError, Error};
use crate::manager::TransactionManager;
use crate::session::Session;
use crate::types::TxParams;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Overrides the default receiver
pub const RECEIVER_VAR: &str = "TX_RECEIVER";

/// Calldata (hex) sent with every transfer
pub const INPUT_DATA_VAR: &str = "TX_INPUT_DATA";

/// Optional upper bound on the wait for a receipt, in seconds
pub const CONFIRMATION_TIMEOUT_VAR: &str = "CONFIRMATION_TIMEOUT_SECS";

/// Overrides the block explorer base URL
pub const EXPLORER_URL_VAR: &str = "EXPLORER_URL";

/// Fixed shape of every cycle
#[derive(Debug, Clone)]
pub struct DriveSettings {
    /// Halt once the balance (ETH) is at or below this
    pub threshold: f64,
    /// Wei sent per transaction
    pub amount: U256,
    pub receiver: Address,
    /// Calldata for the bridge deposit. Empty by default; a deployment sets
    /// it through `TX_INPUT_DATA`.
    pub payload: Bytes,
    /// Pause between cycles
    pub interval: Duration,
    /// Bound on the wait for each receipt (`None` waits indefinitely)
    pub confirmation_timeout: Option<Duration>,
    /// Block explorer base URL for transaction links
    pub explorer_url: String,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            threshold: BALANCE_THRESHOLD,
            amount: scale_ether(TRANSFER_AMOUNT),
            receiver: BRIDGE_CONTRACT,
            payload: Bytes::new(),
            interval: CYCLE_INTERVAL,
            confirmation_timeout: None,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

impl DriveSettings {
    /// Defaults, with receiver, calldata, confirmation timeout and explorer
    /// overridable from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(RECEIVER_VAR) {
            settings.receiver = raw
                .trim()
                .parse::<Address>()
                .map_err(|e| ConfigError::InvalidValue {
                    var: RECEIVER_VAR,
                    reason: e.to_string(),
                })?;
        }

        if let Some(raw) = lookup(INPUT_DATA_VAR) {
            settings.payload = raw
                .trim()
                .parse::<Bytes>()
                .map_err(|e| ConfigError::InvalidValue {
                    var: INPUT_DATA_VAR,
                    reason: e.to_string(),
                })?;
        }

        if let Some(raw) = lookup(CONFIRMATION_TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    var: CONFIRMATION_TIMEOUT_VAR,
                    reason: e.to_string(),
                })?;
            settings.confirmation_timeout = Some(Duration::from_secs(secs));
        }

        if let Some(raw) = lookup(EXPLORER_URL_VAR) {
            settings.explorer_url = raw.trim().to_string();
        }

        Ok(settings)
    }

    /// Request submitted every cycle
    pub fn params(&self) -> TxParams {
        TxParams::new(self.receiver, self.amount, self.payload.clone())
    }

    /// Explorer link for a transaction
    pub fn explorer_link(&self, tx_hash: TxHash) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// Why the loop stopped
#[derive(Debug)]
pub enum Outcome {
    /// Balance reached the threshold. The normal way to stop.
    InsufficientFunds { balance: f64 },
    /// A balance query or transaction failed mid-run
    Failed(Error),
    /// The manager could not be created
    StartupFailed(Error),
}

impl Outcome {
    /// Process exit status: 0 when funds ran low, 1 after a mid-run failure,
    /// 2 when startup failed
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::InsufficientFunds { .. } => 0,
            Outcome::Failed(_) => 1,
            Outcome::StartupFailed(_) => 2,
        }
    }

    /// True unless the loop stopped because funds ran low
    pub fn is_error(&self) -> bool {
        !matches!(self, Outcome::InsufficientFunds { .. })
    }
}

enum State {
    Checking,
    Submitting,
    Reporting(TxHash),
    Waiting,
    Halted(Outcome),
}

/// Create the manager from `config` and drive it until it halts
pub async fn run(config: &Config, settings: &DriveSettings) -> Outcome {
    match TransactionManager::create(config).await {
        Ok(manager) => {
            let manager = manager.with_confirmation_timeout(settings.confirmation_timeout);
            drive(manager, settings).await
        }
        Err(e) => {
            error!(error = %e, "Failed to start");
            Outcome::StartupFailed(e)
        }
    }
}

/// Drive an existing manager until it halts
///
/// The manager is shut down exactly once, whichever way the loop ends.
pub async fn drive<S: Session>(
    mut manager: TransactionManager<S>,
    settings: &DriveSettings,
) -> Outcome {
    if settings.payload.is_empty() {
        warn!("{} is not set; sending transfers without calldata", INPUT_DATA_VAR);
    }

    let outcome = cycle(&manager, settings).await;
    let endpoint = manager.session().endpoint();

    match &outcome {
        Outcome::InsufficientFunds { balance } => {
            warn!(
                %endpoint,
                threshold = settings.threshold,
                "Insufficient balance for the transaction: {:.4} ETH",
                balance
            );
        }
        Outcome::Failed(e) | Outcome::StartupFailed(e) => {
            error!(%endpoint, error = %e, "Halting after error");
        }
    }

    manager.shutdown();
    outcome
}

async fn cycle<S: Session>(manager: &TransactionManager<S>, settings: &DriveSettings) -> Outcome {
    let params = settings.params();
    let mut state = State::Checking;

    loop {
        state = match state {
            // Fresh query on every check
            State::Checking => {
                let balance = match manager.balance().await {
                    Ok(balance) => {
                        info!("Account balance before the transaction: {:.4} ETH", balance);
                        balance
                    }
                    Err(e) => return Outcome::Failed(e.into()),
                };

                if balance <= settings.threshold {
                    State::Halted(Outcome::InsufficientFunds { balance })
                } else {
                    State::Submitting
                }
            }
            State::Submitting => match manager.process(&params).await {
                Ok(tx_hash) => State::Reporting(tx_hash),
                Err(e) => State::Halted(Outcome::Failed(e.into())),
            },
            State::Reporting(tx_hash) => {
                info!(tx_hash = %tx_hash, "Transaction URL: {}", settings.explorer_link(tx_hash));
                match manager.balance().await {
                    Ok(balance) => {
                        info!("Account balance after the transaction: {:.4} ETH", balance);
                        State::Waiting
                    }
                    Err(e) => State::Halted(Outcome::Failed(e.into())),
                }
            }
            State::Waiting => {
                countdown(settings.interval).await;
                info!("Sleep complete. Starting the next transaction.");
                State::Checking
            }
            State::Halted(outcome) => return outcome,
        };
    }
}

/// Sleep for `interval`, logging the remaining whole seconds
async fn countdown(interval: Duration) {
    let secs = interval.as_secs();
    if secs > 0 {
        info!("Sleeping for {} second(s) before initiating another transaction", secs);
    }

    for remaining in (1..=secs).rev() {
        debug!(remaining, "Sleeping");
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    let rest = interval - Duration::from_secs(secs);
    if !rest.is_zero() {
        tokio::time::sleep(rest).await;
    }
}
