//! Signal Interpreter
//!
//! Turns an inbound trend notification into a [`TradeIntent`]. Pure: no I/O,
//! the caller supplies the balance snapshot.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::balance::BalanceSnapshot;
use super::tokens::to_base_units;
use super::trade::{TradeIntent, TradePolicy};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("No data received in signal payload")]
    EmptyPayload,
    #[error("'indicator' is required in the request")]
    MissingIndicator,
    #[error("Unknown indicator '{0}'")]
    UnknownSignal(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
}

/// Direction of the trend notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Bullish,
    Bearish,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Bullish => write!(f, "bullish"),
            SignalKind::Bearish => write!(f, "bearish"),
        }
    }
}

impl FromStr for SignalKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bullish" => Ok(SignalKind::Bullish),
            "bearish" => Ok(SignalKind::Bearish),
            _ => Err(SignalError::UnknownSignal(s.to_string())),
        }
    }
}

/// A trend notification, consumed once
#[derive(Debug, Clone)]
pub struct Signal {
    pub kind: SignalKind,
    pub raw_payload: serde_json::Value,
}

impl Signal {
    pub fn new(kind: SignalKind) -> Self {
        Self {
            kind,
            raw_payload: serde_json::json!({ "indicator": kind.to_string() }),
        }
    }

    /// Parse a webhook body of the form `{ "indicator": "bullish" | "bearish", ... }`.
    ///
    /// Extra fields (ticker, price, timeframe...) are kept in `raw_payload`.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, SignalError> {
        let object = match payload.as_object() {
            Some(obj) if !obj.is_empty() => obj,
            _ => return Err(SignalError::EmptyPayload),
        };

        let indicator = object
            .get("indicator")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SignalError::MissingIndicator)?;

        let kind = indicator.parse()?;
        Ok(Self {
            kind,
            raw_payload: payload,
        })
    }
}

/// Map a signal onto a trade against the current balances.
///
/// - bullish: the whole stable balance is converted into the volatile asset
/// - bearish: the native balance minus `policy.native_reserve` is converted into the stable asset
pub fn interpret(
    signal: &Signal,
    snapshot: &BalanceSnapshot,
    policy: &TradePolicy,
) -> Result<TradeIntent, SignalError> {
    let (from, to, amount, decimals) = match signal.kind {
        SignalKind::Bullish => (
            &policy.stable_mint,
            &policy.volatile_mint,
            snapshot.token_amount,
            policy.stable_decimals,
        ),
        SignalKind::Bearish => {
            let spendable = snapshot.spendable_native(policy.native_reserve);
            if spendable <= Decimal::ZERO {
                return Err(SignalError::InsufficientBalance(format!(
                    "Not enough SOL to trade after reserving {} for fees (have {})",
                    policy.native_reserve, snapshot.native_amount
                )));
            }
            (
                &policy.volatile_mint,
                &policy.stable_mint,
                spendable,
                policy.volatile_decimals,
            )
        }
    };

    let amount_in_base_units = to_base_units(amount, decimals).unwrap_or(0);
    if amount_in_base_units == 0 {
        return Err(SignalError::InsufficientBalance(format!(
            "Nothing to trade for {} signal (balance {})",
            signal.kind, amount
        )));
    }

    Ok(TradeIntent {
        from_asset_id: from.clone(),
        to_asset_id: to.clone(),
        amount_in_base_units,
    })
}
