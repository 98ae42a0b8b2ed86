//! Domain Layer - Core trading and classification logic
//!
//! Pure types and functions with no I/O. Everything that touches the ledger
//! or the aggregator goes through the ports layer.
//!
//! - `signal`: trend notification parsing and interpretation into a trade
//! - `classifier`: balance-delta classification of historical transactions
//! - `confirmation`: lifecycle of a broadcast signature

pub mod balance;
pub mod classifier;
pub mod confirmation;
pub mod signal;
pub mod tokens;
pub mod trade;
pub mod transaction;

pub use balance::BalanceSnapshot;
pub use classifier::{AssetAmount, ClassifiedTransaction, TransactionClassifier, TransactionType};
pub use confirmation::{ConfirmationResult, ConfirmationStatus};
pub use signal::{interpret, Signal, SignalError, SignalKind};
pub use trade::{TradeIntent, TradePolicy};
pub use transaction::{CommitmentTier, SignatureStatus, TokenBalance, TransactionRecord};
