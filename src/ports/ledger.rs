//! Ledger port
//!
//! Everything the service needs from a Solana RPC node. Amounts cross this
//! boundary as integer base units; scaling happens in the application layer.

use async_trait::async_trait;
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;

use crate::domain::{SignatureStatus, TransactionRecord};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// Broadcast options passed to `sendTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub max_retries: usize,
    pub skip_preflight: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            max_retries: 2,
            skip_preflight: true,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Native balance of `owner` in lamports
    async fn get_native_balance(&self, owner: &str) -> Result<u64, LedgerError>;

    /// Sum of all token accounts of `owner` for `mint`, in base units.
    /// Zero when the owner holds no account for the mint.
    async fn get_token_balance(&self, owner: &str, mint: &str) -> Result<u64, LedgerError>;

    /// Broadcast a signed transaction, returning its signature
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> Result<String, LedgerError>;

    /// Lightweight status lookup. `None` when the node has not seen the signature.
    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>, LedgerError>;

    /// Full transaction lookup at `confirmed` commitment. `None` when not found.
    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Most recent signatures involving `address`, newest first
    async fn get_signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<String>, LedgerError>;
}
