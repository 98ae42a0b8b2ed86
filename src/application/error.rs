//! Trade pipeline errors
//!
//! Every component error funnels into [`TradeError`]; the HTTP layer maps it
//! to a status code in one place.

use thiserror::Error;

use crate::adapters::solana::WalletError;
use crate::application::submitter::SubmitError;
use crate::config::ConfigError;
use crate::domain::SignalError;
use crate::ports::{ExecutionError, LedgerError};

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InsufficientBalance(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),
    #[error("Transaction {signature} not finalized after {attempts} attempts")]
    ConfirmationTimedOut { signature: String, attempts: u32 },
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },
}

impl TradeError {
    /// Stable identifier for the error class, used in API responses
    pub fn kind(&self) -> &'static str {
        match self {
            TradeError::Validation(_) => "validation",
            TradeError::InsufficientBalance(_) => "insufficient_balance",
            TradeError::Upstream(_) => "upstream",
            TradeError::LedgerUnavailable(_) => "ledger_unavailable",
            TradeError::BroadcastFailed(_) => "broadcast_failed",
            TradeError::ConfirmationTimedOut { .. } => "confirmation_timed_out",
            TradeError::TransactionFailed { .. } => "transaction_failed",
        }
    }

    /// Signature of the broadcast transaction, once there is one
    pub fn signature(&self) -> Option<&str> {
        match self {
            TradeError::ConfirmationTimedOut { signature, .. }
            | TradeError::TransactionFailed { signature, .. } => Some(signature),
            _ => None,
        }
    }

    /// Caller mistakes, as opposed to failures of the service or its upstreams
    pub fn is_client_error(&self) -> bool {
        matches!(self, TradeError::Validation(_) | TradeError::InsufficientBalance(_))
    }
}

impl From<SignalError> for TradeError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::InsufficientBalance(msg) => TradeError::InsufficientBalance(msg),
            other => TradeError::Validation(other.to_string()),
        }
    }
}

impl From<LedgerError> for TradeError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAddress(_) | LedgerError::InvalidSignature(_) => {
                TradeError::Validation(err.to_string())
            }
            other => TradeError::LedgerUnavailable(other.to_string()),
        }
    }
}

impl From<ExecutionError> for TradeError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::InvalidParameters(msg) => TradeError::Validation(msg),
            other => TradeError::Upstream(other.to_string()),
        }
    }
}

impl From<SubmitError> for TradeError {
    fn from(err: SubmitError) -> Self {
        TradeError::BroadcastFailed(err.to_string())
    }
}

impl From<WalletError> for TradeError {
    fn from(err: WalletError) -> Self {
        TradeError::BroadcastFailed(err.to_string())
    }
}

impl From<ConfigError> for TradeError {
    fn from(err: ConfigError) -> Self {
        TradeError::Validation(err.to_string())
    }
}
