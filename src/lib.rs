//! trendswap - trend-signal driven swaps on Solana via Jupiter
//!
//! Webhook signals (bullish/bearish) become SOL/USDC swaps: balances are
//! read, a quote and swap transaction are fetched from Jupiter, signed with
//! the service wallet, broadcast and polled until finalized. A read-only
//! history endpoint classifies past transactions of any address.
//!
//! # Modules
//!
//! - `domain`: Signals, trade intents, balances, confirmation states, classifier
//! - `ports`: Trait abstractions (LedgerPort, SwapPort) and in-memory fakes
//! - `adapters`: External implementations (Jupiter, Solana, HTTP, CLI)
//! - `application`: Trade pipeline, confirmation monitor, history service
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
