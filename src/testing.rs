//! In-memory node used by unit tests

use crate::error::SessionError;
use crate::session::{ConfirmationStatus, Receipt, Session};
use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip1559::Eip1559Estimation;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::http::reqwest::Url;
use alloy::transports::TransportErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub(crate) const TEST_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub(crate) const TEST_CHAIN_ID: u64 = 11155420;

/// Node state shared between a `MockSession` and the test inspecting it
#[derive(Debug, Default)]
pub(crate) struct MockNode {
    pub balance: U256,
    pub nonce: u64,
    pub gas_estimate: u64,
    pub fail_balance: bool,
    pub fail_estimate: bool,
    pub fail_submit: bool,
    pub fail_confirm: bool,
    pub revert: bool,
    pub balance_queries: usize,
    pub nonce_queries: usize,
    pub chain_id_queries: usize,
    pub estimates: Vec<TransactionRequest>,
    pub submitted: Vec<TxEnvelope>,
    pub confirm_timeouts: Vec<Option<Duration>>,
    pub disconnect_calls: usize,
    pub releases: usize,
}

pub(crate) struct MockSession {
    endpoint: Url,
    connected: bool,
    node: Arc<Mutex<MockNode>>,
}

impl MockSession {
    /// A connected session plus a handle on its node
    pub fn new(node: MockNode) -> (Self, Arc<Mutex<MockNode>>) {
        let node = Arc::new(Mutex::new(node));
        let session = Self {
            endpoint: "http://mock.node".parse().unwrap(),
            connected: true,
            node: node.clone(),
        };
        (session, node)
    }

    fn node(&self) -> Result<MutexGuard<'_, MockNode>, SessionError> {
        if !self.connected {
            return Err(SessionError::Disconnected);
        }
        Ok(self.node.lock().unwrap())
    }
}

fn remote_error(message: &str) -> SessionError {
    SessionError::Rpc(TransportErrorKind::custom_str(message))
}

impl Session for MockSession {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn balance_of(&self, _address: Address) -> Result<U256, SessionError> {
        let mut node = self.node()?;
        node.balance_queries += 1;
        if node.fail_balance {
            return Err(remote_error("balance unavailable"));
        }
        Ok(node.balance)
    }

    async fn nonce_of(&self, _address: Address) -> Result<u64, SessionError> {
        let mut node = self.node()?;
        node.nonce_queries += 1;
        Ok(node.nonce)
    }

    async fn chain_id(&self) -> Result<u64, SessionError> {
        let mut node = self.node()?;
        node.chain_id_queries += 1;
        Ok(TEST_CHAIN_ID)
    }

    async fn fee_estimate(&self) -> Result<Eip1559Estimation, SessionError> {
        self.node()?;
        Ok(Eip1559Estimation {
            max_fee_per_gas: 2_000_000_000,
            max_priority_fee_per_gas: 1_000_000,
        })
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, SessionError> {
        let mut node = self.node()?;
        node.estimates.push(tx);
        if node.fail_estimate {
            return Err(remote_error("execution reverted"));
        }
        Ok(node.gas_estimate)
    }

    async fn submit(&self, tx: TxEnvelope) -> Result<TxHash, SessionError> {
        let mut node = self.node()?;
        if node.fail_submit {
            return Err(remote_error("replacement transaction underpriced"));
        }
        let hash = *tx.tx_hash();
        node.nonce += 1;
        node.balance = node.balance.saturating_sub(tx.value());
        node.submitted.push(tx);
        Ok(hash)
    }

    async fn await_confirmation(
        &self,
        hash: TxHash,
        timeout: Option<Duration>,
    ) -> Result<Receipt, SessionError> {
        let mut node = self.node()?;
        node.confirm_timeouts.push(timeout);
        if node.fail_confirm {
            return Err(remote_error("receipt lookup failed"));
        }
        let status = if node.revert {
            ConfirmationStatus::Reverted
        } else {
            ConfirmationStatus::Included
        };
        Ok(Receipt {
            hash,
            status,
            block_number: Some(node.submitted.len() as u64),
            gas_used: node.gas_estimate,
        })
    }

    fn disconnect(&mut self) {
        let mut node = self.node.lock().unwrap();
        node.disconnect_calls += 1;
        if self.connected {
            self.connected = false;
            node.releases += 1;
        }
    }
}
