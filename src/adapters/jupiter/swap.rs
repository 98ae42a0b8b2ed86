//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter swap-build API.

use serde::{Deserialize, Serialize};

/// Priority tier Jupiter uses to estimate the prioritization fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriorityLevel {
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityLevelWithMaxLamports {
    pub max_lamports: u64,
    pub priority_level: PriorityLevel,
}

/// `prioritizationFeeLamports` body: a tier capped at a lamport ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationFee {
    pub priority_level_with_max_lamports: PriorityLevelWithMaxLamports,
}

impl PrioritizationFee {
    pub fn capped(priority_level: PriorityLevel, max_lamports: u64) -> Self {
        Self {
            priority_level_with_max_lamports: PriorityLevelWithMaxLamports {
                max_lamports,
                priority_level,
            },
        }
    }
}

/// Request parameters for building a swap transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// Wallet that will sign and pay for the transaction
    pub user_public_key: String,
    /// The full quote response from `/quote`, unmodified
    pub quote_response: serde_json::Value,
    #[serde(default = "default_true")]
    pub dynamic_compute_unit_limit: bool,
    #[serde(default)]
    pub dynamic_slippage: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritization_fee_lamports: Option<PrioritizationFee>,
}

fn default_true() -> bool {
    true
}

impl SwapRequest {
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            dynamic_compute_unit_limit: true,
            dynamic_slippage: false,
            prioritization_fee_lamports: None,
        }
    }

    pub fn with_priority_fee(mut self, fee: PrioritizationFee) -> Self {
        self.prioritization_fee_lamports = Some(fee);
        self
    }

    pub fn with_dynamic_compute_limit(mut self, enabled: bool) -> Self {
        self.dynamic_compute_unit_limit = enabled;
        self
    }

    pub fn with_dynamic_slippage(mut self, enabled: bool) -> Self {
        self.dynamic_slippage = enabled;
        self
    }
}

/// Response from Jupiter swap API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction, unsigned
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: u64,
    #[serde(default)]
    pub prioritization_fee_lamports: u64,
}
