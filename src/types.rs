//! Transaction request types

use crate::constants::scale_ether;
use alloy::primitives::{Address, Bytes, U256};

/// What to send in one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxParams {
    /// Receiving address
    pub receiver: Address,
    /// Value in wei
    pub amount: U256,
    /// Calldata
    pub payload: Bytes,
    /// Free-form note, reported in logs only
    pub memo: Option<String>,
}

impl TxParams {
    /// Create a new transaction request
    pub fn new(receiver: Address, amount: U256, payload: impl Into<Bytes>) -> Self {
        Self {
            receiver,
            amount,
            payload: payload.into(),
            memo: None,
        }
    }

    /// Create a request sending `amount` ETH
    pub fn ether(receiver: Address, amount: f64, payload: impl Into<Bytes>) -> Self {
        Self::new(receiver, scale_ether(amount), payload)
    }

    /// Attach a memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}
