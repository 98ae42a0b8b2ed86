//! Known mints and base-unit conversions
//!
//! Amounts cross the ledger boundary as integer base units and are held as
//! `Decimal` inside the domain so that scaling never goes through floats.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Wrapped SOL mint; also used as the asset id of the native balance
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// USDC mint on mainnet
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// Decimals of the native asset (lamports per SOL = 10^9)
pub const SOL_DECIMALS: u8 = 9;

/// Decimals of USDC
pub const USDC_DECIMALS: u8 = 6;

/// Convert integer base units into a UI amount.
pub fn from_base_units(amount: u64, decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(amount as i128, decimals as u32)
}

/// Convert integer base units into a UI amount, `None` when `decimals`
/// exceeds what `Decimal` can represent (28).
pub fn try_from_base_units(amount: u64, decimals: u8) -> Option<Decimal> {
    Decimal::try_from_i128_with_scale(amount as i128, decimals as u32).ok()
}

/// Convert a signed base-unit delta into a UI amount.
pub fn from_signed_base_units(amount: i128, decimals: u8) -> Decimal {
    Decimal::from_i128_with_scale(amount, decimals as u32)
}

/// Convert a UI amount into integer base units, rounding toward zero.
///
/// Returns `None` for negative amounts or values that do not fit in `u64`.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Option<u64> {
    if amount.is_sign_negative() {
        return None;
    }
    let scale = Decimal::from(10u64.checked_pow(decimals as u32)?);
    amount.checked_mul(scale)?.floor().to_u64()
}
