//! TransactionManager - builds, signs, submits and confirms transactions

use crate::config::Config;
use crate::constants::{gas_limit_with_margin, unscale_ether};
use crate::error::{Error, SessionError, TransactionError};
use crate::session::{RpcSession, Session, SessionOptions};
use crate::signer::SignerIdentity;
use crate::types::TxParams;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tracing::{debug, error, info};

/// Binds a signing identity to the session used to reach the node
pub struct TransactionManager<S: Session> {
    identity: SignerIdentity,
    session: S,
    confirmation_timeout: Option<Duration>,
}

impl TransactionManager<RpcSession> {
    /// Derive the identity and connect to the configured endpoint
    ///
    /// The identity is derived before any network I/O, so a malformed key
    /// never opens a connection.
    pub async fn create(config: &Config) -> Result<Self, Error> {
        Self::create_with_options(config, SessionOptions::default()).await
    }

    pub async fn create_with_options(
        config: &Config,
        options: SessionOptions,
    ) -> Result<Self, Error> {
        let identity = SignerIdentity::derive(config.secret())?;
        let session = RpcSession::connect(config.rpc_url(), options).await?;
        info!(address = %identity.address(), "Connected to provider for account");

        Ok(Self::new(identity, session))
    }
}

impl<S: Session> TransactionManager<S> {
    pub fn new(identity: SignerIdentity, session: S) -> Self {
        Self {
            identity,
            session,
            confirmation_timeout: None,
        }
    }

    /// Bound the wait for each receipt (`None` waits indefinitely)
    pub fn with_confirmation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Address every transaction is sent from
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Balance of the bound account in wei
    pub async fn balance_wei(&self) -> Result<U256, SessionError> {
        let balance = self.session.balance_of(self.address()).await?;
        debug!(address = %self.address(), %balance, "Balance in wei");
        Ok(balance)
    }

    /// Balance of the bound account in ETH
    pub async fn balance(&self) -> Result<f64, SessionError> {
        let balance = unscale_ether(self.balance_wei().await?);
        debug!(address = %self.address(), balance, "Balance in ether");
        Ok(balance)
    }

    /// Send one transaction and wait for it to be included
    ///
    /// Nonce, chain id and fees are queried fresh on every call. The gas limit
    /// is the node's estimate plus a fixed 20% margin, truncated. One call is
    /// one attempt: nothing is retried.
    pub async fn process(&self, params: &TxParams) -> Result<TxHash, TransactionError> {
        info!(
            receiver = %params.receiver,
            amount = %params.amount,
            memo = params.memo.as_deref().unwrap_or(""),
            "Starting transaction process..."
        );

        self.try_process(params)
            .await
            .inspect_err(|e| error!(error = %e, "Error processing transaction"))
    }

    async fn try_process(&self, params: &TxParams) -> Result<TxHash, TransactionError> {
        let request = self
            .build_request(params)
            .await
            .map_err(TransactionError::Prepare)?;

        let estimate = self
            .session
            .estimate_gas(request.clone())
            .await
            .map_err(TransactionError::Estimate)?;
        let gas_limit = gas_limit_with_margin(estimate);
        debug!(estimate, gas_limit, "Estimated gas");

        let envelope = self
            .identity
            .sign_transaction(request.with_gas_limit(gas_limit))
            .await
            .map_err(TransactionError::Sign)?;

        let tx_hash = self
            .session
            .submit(envelope)
            .await
            .map_err(TransactionError::Submit)?;
        info!(tx_hash = %tx_hash, "Transaction sent");

        let receipt = self
            .session
            .await_confirmation(tx_hash, self.confirmation_timeout)
            .await
            .map_err(TransactionError::Confirm)?;

        if !receipt.succeeded() {
            return Err(TransactionError::Reverted(tx_hash));
        }

        info!(
            tx_hash = %tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            "Transaction confirmed"
        );
        Ok(tx_hash)
    }

    /// Unsigned request with everything but the gas limit
    async fn build_request(&self, params: &TxParams) -> Result<TransactionRequest, SessionError> {
        let address = self.address();
        let nonce = self.session.nonce_of(address).await?;
        let chain_id = self.session.chain_id().await?;
        let fees = self.session.fee_estimate().await?;

        Ok(TransactionRequest::default()
            .with_from(address)
            .with_to(params.receiver)
            .with_value(params.amount)
            .with_input(params.payload.clone())
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas))
    }

    /// Disconnect the session. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.session.disconnect();
    }
}
