//! Swap port
//!
//! Quote and swap-build calls against a DEX aggregator. The wire types are the
//! Jupiter ones; the quote is passed back untouched when building the swap.

use async_trait::async_trait;
use thiserror::Error;

pub use crate::adapters::jupiter::{QuoteRequest, QuoteResponse, SwapRequest, SwapResponse};

#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),
    #[error("Swap build failed: {0}")]
    SwapBuildFailed(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapPort: Send + Sync {
    /// Best route for the requested amount. Single attempt, no retries.
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError>;

    /// Unsigned swap transaction for a previously fetched quote
    async fn build_swap(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError>;
}
