use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wallet balances read fresh from the ledger for a single trade decision.
///
/// `native_amount` is SOL, `token_amount` is the tracked stable token (USDC).
/// Never cached across signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub native_amount: Decimal,
    pub token_amount: Decimal,
    pub as_of: DateTime<Utc>,
}

impl BalanceSnapshot {
    pub fn new(native_amount: Decimal, token_amount: Decimal) -> Self {
        Self {
            native_amount,
            token_amount,
            as_of: Utc::now(),
        }
    }

    /// Native balance left after keeping `reserve` back for fees
    pub fn spendable_native(&self, reserve: Decimal) -> Decimal {
        self.native_amount - reserve
    }
}
