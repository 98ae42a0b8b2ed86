//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - The Solana ledger (balances, broadcast, status, history)
//! - Swap routing and transaction building (Jupiter)

pub mod execution;
pub mod ledger;
pub mod mocks;

pub use execution::{ExecutionError, SwapPort};
pub use ledger::{LedgerError, LedgerPort, SendOptions};
