use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::tokens::{SOL_DECIMALS, SOL_MINT, USDC_DECIMALS, USDC_MINT};

/// Directional trade derived from a signal and a balance snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub from_asset_id: String,
    pub to_asset_id: String,
    /// Always > 0; an intent with nothing to trade is rejected before construction
    pub amount_in_base_units: u64,
}

/// Fixed policy describing the traded pair and the fee reserve
#[derive(Debug, Clone, PartialEq)]
pub struct TradePolicy {
    /// Stable reference asset (USDC)
    pub stable_mint: String,
    pub stable_decimals: u8,
    /// Volatile asset; its balance is the native balance (SOL)
    pub volatile_mint: String,
    pub volatile_decimals: u8,
    /// Native amount kept back so the wallet can still pay network fees
    pub native_reserve: Decimal,
}

impl Default for TradePolicy {
    fn default() -> Self {
        Self {
            stable_mint: USDC_MINT.to_string(),
            stable_decimals: USDC_DECIMALS,
            volatile_mint: SOL_MINT.to_string(),
            volatile_decimals: SOL_DECIMALS,
            native_reserve: dec!(0.01),
        }
    }
}
