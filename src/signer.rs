//! Local private key signing identity

use crate::error::IdentityError;
use alloy::consensus::TxEnvelope;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Signature};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::fmt;

/// Address and key material derived from a raw private key.
///
/// Immutable once derived. Signing is an explicit step: the manager builds an
/// unsigned request, asks the identity for a signed envelope and submits that.
#[derive(Clone)]
pub struct SignerIdentity {
    address: Address,
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
}

impl SignerIdentity {
    /// Derive an identity from a hex-encoded private key (with or without 0x prefix)
    pub fn derive(secret: impl AsRef<str>) -> Result<Self, IdentityError> {
        let key = secret.as_ref().trim();
        if key.is_empty() {
            return Err(IdentityError::Empty);
        }
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| IdentityError::Malformed(format!("{}", e)))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());

        Ok(Self {
            address,
            signer,
            wallet,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a fully populated transaction request
    ///
    /// The request must carry nonce, chain id, fees and gas limit; the `from`
    /// field is stamped with this identity's address.
    pub async fn sign_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TxEnvelope, IdentityError> {
        request
            .with_from(self.address)
            .build(&self.wallet)
            .await
            .map_err(|e| IdentityError::Signing(e.to_string()))
    }

    /// Sign arbitrary bytes (EIP-191 personal message)
    pub fn sign_message(&self, message: &[u8]) -> Result<Signature, IdentityError> {
        self.signer
            .sign_message_sync(message)
            .map_err(|e| IdentityError::Signing(e.to_string()))
    }
}

impl fmt::Debug for SignerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
