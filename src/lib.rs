//! bridge-pinger
//!
//! Repeatedly sends a fixed transfer to a bridge contract on Optimism Sepolia,
//! reporting each transaction, until the account balance drops to the
//! threshold.
//!
//! # Example
//!
//! ```rust,ignore
//! use bridge_pinger::{driver, Config, DriveSettings, TransactionManager, TxParams};
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let config = Config::new("0x...", "https://sepolia.optimism.io")?;
//!
//!     // Single transaction
//!     let manager = TransactionManager::create(&config).await?;
//!     println!("Balance: {:.4} ETH", manager.balance().await?);
//!     let tx_hash = manager.process(&TxParams::ether(receiver, 0.1, payload)).await?;
//!
//!     // Or loop until funds run low
//!     let outcome = driver::run(&config, &DriveSettings::default()).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod manager;
pub mod session;
pub mod signer;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::Config;
pub use driver::{drive, run, DriveSettings, Outcome};
pub use error::{ConfigError, Error, IdentityError, SessionError, TransactionError};
pub use manager::TransactionManager;
pub use session::{ConfirmationStatus, Receipt, RpcSession, Session, SessionOptions};
pub use signer::SignerIdentity;
pub use types::TxParams;
