//! Application Layer - Use cases over the ports
//!
//! - `pipeline`: signal to finalized swap, serialized per wallet
//! - `history`: classified transaction history for any address

pub mod balance_oracle;
pub mod error;
pub mod history;
pub mod monitor;
pub mod pipeline;
pub mod submitter;

pub use balance_oracle::BalanceOracle;
pub use error::TradeError;
pub use history::{HistoryLimits, HistoryService};
pub use monitor::{ConfirmationMonitor, MonitorConfig};
pub use pipeline::{SwapSettings, TradeOutcome, TradePipeline};
pub use submitter::{SubmitError, TransactionSubmitter};
