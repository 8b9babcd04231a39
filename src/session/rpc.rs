//! JSON-RPC over HTTP session backed by an alloy provider

use super::{Receipt, Session, SessionOptions};
use crate::error::SessionError;
use alloy::consensus::TxEnvelope;
use alloy::eips::eip1559::Eip1559Estimation;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::Ethereum;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::http::reqwest::{Client, Url};
use alloy::transports::http::Http;
use std::time::Duration;
use tracing::{debug, error, info};

/// Session over a pooled HTTP client.
///
/// The provider (and with it the HTTP connection pool) lives in an `Option`:
/// `None` means disconnected. Dropping a connected session disconnects it.
pub struct RpcSession {
    endpoint: Url,
    options: SessionOptions,
    provider: Option<RootProvider<Ethereum>>,
}

impl RpcSession {
    /// Open a session and verify the node answers
    ///
    /// The liveness check is an `eth_chainId` round trip; any failure is a
    /// [`SessionError::Connection`].
    pub async fn connect(endpoint: &Url, options: SessionOptions) -> Result<Self, SessionError> {
        info!(endpoint = %endpoint, "Connecting to RPC provider...");

        let http = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| SessionError::Connection {
                endpoint: endpoint.to_string(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        let transport = Http::with_client(http, endpoint.clone());
        let provider = RootProvider::<Ethereum>::new(RpcClient::new(transport, false));

        match provider.get_chain_id().await {
            Ok(chain_id) => {
                info!(endpoint = %endpoint, chain_id, "Successfully connected to RPC provider");
            }
            Err(e) => {
                error!(endpoint = %endpoint, error = %e, "Failed to connect to RPC provider");
                return Err(SessionError::Connection {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(Self {
            endpoint: endpoint.clone(),
            options,
            provider: Some(provider),
        })
    }

    fn provider(&self) -> Result<&RootProvider<Ethereum>, SessionError> {
        self.provider.as_ref().ok_or(SessionError::Disconnected)
    }

    async fn poll_receipt(&self, hash: TxHash) -> Result<Receipt, SessionError> {
        let provider = self.provider()?;

        loop {
            let receipt: Option<TransactionReceipt> =
                provider.get_transaction_receipt(hash).await?;

            if let Some(receipt) = receipt {
                return Ok(Receipt::from(&receipt));
            }

            debug!(tx_hash = %hash, "Transaction pending");
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

impl Session for RpcSession {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn is_connected(&self) -> bool {
        self.provider.is_some()
    }

    async fn balance_of(&self, address: Address) -> Result<U256, SessionError> {
        let balance = self.provider()?.get_balance(address).await?;
        debug!(%address, %balance, "Fetched balance");
        Ok(balance)
    }

    async fn nonce_of(&self, address: Address) -> Result<u64, SessionError> {
        Ok(self.provider()?.get_transaction_count(address).await?)
    }

    async fn chain_id(&self) -> Result<u64, SessionError> {
        Ok(self.provider()?.get_chain_id().await?)
    }

    async fn fee_estimate(&self) -> Result<Eip1559Estimation, SessionError> {
        Ok(self.provider()?.estimate_eip1559_fees().await?)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> Result<u64, SessionError> {
        Ok(self.provider()?.estimate_gas(tx).await?)
    }

    async fn submit(&self, tx: TxEnvelope) -> Result<TxHash, SessionError> {
        let raw = tx.encoded_2718();
        let pending = self.provider()?.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn await_confirmation(
        &self,
        hash: TxHash,
        timeout: Option<Duration>,
    ) -> Result<Receipt, SessionError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.poll_receipt(hash))
                .await
                .map_err(|_| SessionError::Timeout {
                    hash,
                    waited: limit,
                })?,
            None => self.poll_receipt(hash).await,
        }
    }

    fn disconnect(&mut self) {
        match self.provider.take() {
            Some(provider) => {
                info!(endpoint = %self.endpoint, "Disconnecting from RPC provider...");
                // Dropping the last provider handle closes the pooled connections
                drop(provider);
            }
            None => debug!(endpoint = %self.endpoint, "RPC session already disconnected"),
        }
    }
}

impl Drop for RpcSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for RpcSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcSession")
            .field("endpoint", &self.endpoint.as_str())
            .field("connected", &self.is_connected())
            .field("options", &self.options)
            .finish()
    }
}
