//! Jupiter Adapter
//!
//! Implementation of the SwapPort for the Jupiter DEX aggregator:
//! quote fetching and unsigned swap transaction building.

mod client;
mod quote;
mod swap;

pub use client::{JupiterClient, JupiterConfig};
pub use quote::{QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo};
pub use swap::{PrioritizationFee, PriorityLevel, PriorityLevelWithMaxLamports, SwapRequest, SwapResponse};
