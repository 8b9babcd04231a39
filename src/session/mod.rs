//! RPC session abstraction
//!
//! The transaction manager talks to the node only through the [`Session`]
//! trait, so the same manager and drive loop run against a live JSON-RPC
//! endpoint ([`RpcSession`]) or an in-memory node in tests.

mod rpc;

pub use rpc::RpcSession;

use crate::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
use crate::error::SessionError;
use alloy::consensus::TxEnvelope;
use alloy::eips::eip1559::Eip1559Estimation;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::http::reqwest::Url;
use std::future::Future;
use std::time::Duration;

/// Tunables for an RPC session
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Delay between receipt polls
    pub poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Whether an included transaction succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Included,
    Reverted,
}

/// The node's record that a transaction was included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub hash: TxHash,
    pub status: ConfirmationStatus,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == ConfirmationStatus::Included
    }
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        let status = if receipt.status() {
            ConfirmationStatus::Included
        } else {
            ConfirmationStatus::Reverted
        };

        Self {
            hash: receipt.transaction_hash,
            status,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

/// Connection to a blockchain node
///
/// Every query method fails with [`SessionError::Disconnected`] once
/// [`Session::disconnect`] has been called.
pub trait Session: Send + Sync {
    /// Endpoint this session talks to
    fn endpoint(&self) -> &Url;

    /// Returns false after disconnect
    fn is_connected(&self) -> bool;

    /// Native balance of `address` in wei
    fn balance_of(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<U256, SessionError>> + Send;

    /// Next nonce for `address` (its transaction count)
    fn nonce_of(&self, address: Address)
        -> impl Future<Output = Result<u64, SessionError>> + Send;

    /// Chain identifier reported by the node
    fn chain_id(&self) -> impl Future<Output = Result<u64, SessionError>> + Send;

    /// Current EIP-1559 fee suggestion
    fn fee_estimate(&self)
        -> impl Future<Output = Result<Eip1559Estimation, SessionError>> + Send;

    /// Gas the node expects `tx` to consume
    fn estimate_gas(
        &self,
        tx: TransactionRequest,
    ) -> impl Future<Output = Result<u64, SessionError>> + Send;

    /// Broadcast a signed transaction, returning its hash once the node accepts it
    fn submit(&self, tx: TxEnvelope) -> impl Future<Output = Result<TxHash, SessionError>> + Send;

    /// Wait until `hash` is included, or until `timeout` elapses
    fn await_confirmation(
        &self,
        hash: TxHash,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<Receipt, SessionError>> + Send;

    /// Release transport resources. Idempotent and infallible.
    fn disconnect(&mut self);
}
