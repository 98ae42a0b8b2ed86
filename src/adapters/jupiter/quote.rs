//! Jupiter Quote Types
//!
//! Request and response structures for the Jupiter quote API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request parameters for getting a swap quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Input token mint address
    pub input_mint: String,
    /// Output token mint address
    pub output_mint: String,
    /// Amount in base units (lamports for SOL)
    pub amount: u64,
    /// Slippage tolerance in basis points (1 = 0.01%)
    pub slippage_bps: u16,
    /// Route only through highly liquid intermediate tokens
    #[serde(default)]
    pub restrict_intermediate_tokens: bool,
    /// Only use direct routes (no intermediate tokens)
    #[serde(default)]
    pub only_direct_routes: bool,
}

impl QuoteRequest {
    pub fn new(input_mint: String, output_mint: String, amount: u64, slippage_bps: u16) -> Self {
        Self {
            input_mint,
            output_mint,
            amount,
            slippage_bps,
            restrict_intermediate_tokens: false,
            only_direct_routes: false,
        }
    }

    pub fn with_restricted_intermediates(mut self, restrict: bool) -> Self {
        self.restrict_intermediate_tokens = restrict;
        self
    }

    pub fn with_direct_routes(mut self, direct: bool) -> Self {
        self.only_direct_routes = direct;
        self
    }

    /// Query string pairs in the order the API documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("inputMint", self.input_mint.clone()),
            ("outputMint", self.output_mint.clone()),
            ("amount", self.amount.to_string()),
            ("slippageBps", self.slippage_bps.to_string()),
        ];
        if self.restrict_intermediate_tokens {
            pairs.push(("restrictIntermediateTokens", "true".to_string()));
        }
        if self.only_direct_routes {
            pairs.push(("onlyDirectRoutes", "true".to_string()));
        }
        pairs
    }
}

/// Response from Jupiter quote API.
///
/// Forwarded verbatim to `/swap`, so unknown fields are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub input_mint: String,
    pub output_mint: String,
    /// Input amount in base units
    pub in_amount: String,
    /// Output amount in base units
    pub out_amount: String,
    /// Minimum output amount after slippage
    pub other_amount_threshold: String,
    pub swap_mode: String,
    pub slippage_bps: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_impact_pct: Option<String>,
    pub route_plan: Vec<RoutePlanStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_slot: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<f64>,
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

impl QuoteResponse {
    pub fn input_amount(&self) -> u64 {
        self.in_amount.parse().unwrap_or(0)
    }

    pub fn output_amount(&self) -> u64 {
        self.out_amount.parse().unwrap_or(0)
    }

    pub fn min_output_amount(&self) -> u64 {
        self.other_amount_threshold.parse().unwrap_or(0)
    }

    /// Price impact in percent, `None` if the API sent something unparsable
    pub fn price_impact(&self) -> Option<Decimal> {
        self.price_impact_pct.as_deref()?.parse().ok()
    }

    /// A quote is usable when it yields output through at least one route
    pub fn is_routable(&self) -> bool {
        self.output_amount() > 0 && !self.route_plan.is_empty()
    }

    /// DEX labels along the route, e.g. `Whirlpool -> Raydium`
    pub fn route_labels(&self) -> String {
        self.route_plan
            .iter()
            .map(|step| step.swap_info.label.as_deref().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanStep {
    pub swap_info: SwapInfo,
    /// Percentage of the trade going through this route
    pub percent: u8,
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    /// AMM key (pool identifier)
    pub amm_key: String,
    /// DEX label (e.g. "Raydium", "Orca")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_mint: Option<String>,
}
