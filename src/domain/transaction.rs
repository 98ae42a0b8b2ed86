//! Ledger-agnostic views of Solana transactions and signature statuses

use serde::{Deserialize, Serialize};

/// Commitment tier reported for a signature, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentTier {
    Processed,
    Confirmed,
    Finalized,
}

/// Lightweight signature status (`getSignatureStatuses`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub tier: Option<CommitmentTier>,
    /// Execution error, if the transaction landed and failed
    pub error: Option<String>,
}

impl SignatureStatus {
    pub fn is_finalized(&self) -> bool {
        self.error.is_none() && self.tier == Some(CommitmentTier::Finalized)
    }
}

/// Token balance entry from transaction metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub account_index: u8,
    pub mint: String,
    /// Owner of the token account; absent on very old transactions
    pub owner: Option<String>,
    /// Raw amount in base units
    pub amount: u64,
    pub decimals: u8,
}

/// Full transaction lookup (`getTransaction`) reduced to what the
/// monitor and the classifier need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    /// Fee in lamports, paid by account index 0
    pub fee: u64,
    /// Execution error; `None` means the transaction succeeded
    pub error: Option<String>,
    /// Static and loaded account keys, in message order
    pub account_keys: Vec<String>,
    /// Native balances in lamports, aligned with `account_keys`
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub pre_token_balances: Vec<TokenBalance>,
    pub post_token_balances: Vec<TokenBalance>,
}

impl TransactionRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Position of `address` in the account key list
    pub fn account_index(&self, address: &str) -> Option<usize> {
        self.account_keys.iter().position(|k| k == address)
    }
}
