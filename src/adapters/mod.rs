//! Adapters Layer - External System Implementations
//!
//! - Jupiter: swap aggregator API client (`SwapPort`)
//! - Solana: RPC client (`LedgerPort`) and wallet management
//! - HTTP: axum routes over the application layer
//! - CLI: command-line argument definitions

pub mod cli;
pub mod http;
pub mod jupiter;
pub mod solana;

pub use cli::CliApp;
pub use jupiter::JupiterClient;
pub use solana::{SolanaClient, WalletManager};
