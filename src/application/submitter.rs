//! Transaction Submitter
//!
//! Sole owner of the signing key. Decodes the aggregator's unsigned
//! transaction, signs it once and hands it to the ledger for broadcast.

use std::sync::Arc;

use base64::Engine;
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;

use crate::adapters::solana::{WalletError, WalletManager};
use crate::ports::{LedgerPort, SendOptions};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Invalid transaction payload: {0}")]
    InvalidTransaction(String),
    #[error(transparent)]
    Signing(#[from] WalletError),
    #[error("Node rejected transaction: {0}")]
    Rejected(String),
}

pub struct TransactionSubmitter {
    wallet: WalletManager,
    ledger: Arc<dyn LedgerPort>,
    options: SendOptions,
}

impl TransactionSubmitter {
    pub fn new(wallet: WalletManager, ledger: Arc<dyn LedgerPort>, options: SendOptions) -> Self {
        Self { wallet, ledger, options }
    }

    /// Base58 address of the signing wallet
    pub fn public_key(&self) -> String {
        self.wallet.public_key()
    }

    /// Sign the base64 transaction from `/swap` and broadcast it.
    ///
    /// Returns the signature reported by the node.
    pub async fn sign_and_send(&self, unsigned_base64: &str) -> Result<String, SubmitError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(unsigned_base64.trim())
            .map_err(|e| SubmitError::InvalidTransaction(format!("base64: {}", e)))?;

        let unsigned: VersionedTransaction = bincode::deserialize(&bytes)
            .map_err(|e| SubmitError::InvalidTransaction(format!("bincode: {}", e)))?;

        let signed = self.wallet.sign_versioned(unsigned.message)?;

        let signature = self
            .ledger
            .send_transaction(&signed, self.options)
            .await
            .map_err(|e| SubmitError::Rejected(e.to_string()))?;

        tracing::info!(%signature, "Transaction broadcast");
        Ok(signature)
    }
}
