//! Error types for bridge-pinger
//!
//! One error type per layer. [`Error`] unifies them for callers that only
//! need to report what went wrong.

use alloy::primitives::TxHash;
use alloy::transports::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Invalid or missing configuration input
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid RPC URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Failure to derive or use the signing identity
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("signing secret is empty")]
    Empty,
    #[error("malformed signing secret: {0}")]
    Malformed(String),
    #[error("failed to sign: {0}")]
    Signing(String),
}

/// Errors raised by an RPC session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },
    #[error("session is disconnected")]
    Disconnected,
    #[error("rpc error: {0}")]
    Rpc(#[from] TransportError),
    #[error("no receipt for {hash} after {waited:?}")]
    Timeout { hash: TxHash, waited: Duration },
}

/// A failed attempt to process one transaction.
///
/// Each variant names the step that failed and carries the cause.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("failed to prepare transaction: {0}")]
    Prepare(#[source] SessionError),
    #[error("gas estimation failed: {0}")]
    Estimate(#[source] SessionError),
    #[error("failed to sign transaction: {0}")]
    Sign(#[source] IdentityError),
    #[error("failed to submit transaction: {0}")]
    Submit(#[source] SessionError),
    #[error("failed to confirm transaction: {0}")]
    Confirm(#[source] SessionError),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
