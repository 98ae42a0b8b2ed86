//! Transaction Classifier
//!
//! Reconstructs what a historical transaction meant for one wallet from its
//! balance deltas alone. Rules are evaluated in strict precedence order and the
//! first match wins:
//!
//! 1. per-asset delta (`post - pre`) for every mint seen in either balance set,
//!    plus the native delta with the fee added back when the wallet paid it
//! 2. fee-only: native delta within epsilon and no token movement
//! 3. swap: at least one asset spent and one received (refined to buy/sell)
//! 4. single outgoing asset: token transfer or native transfer
//! 5. anything else: transfer
//!
//! A swap always moves at least one token, so rule 2 can never swallow it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::tokens::{from_signed_base_units, try_from_base_units, SOL_DECIMALS, SOL_MINT, USDC_MINT};
use super::transaction::{TokenBalance, TransactionRecord};

/// Native deltas smaller than this (in SOL) are treated as zero
pub const NATIVE_EPSILON: Decimal = dec!(0.00001);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Swap,
    #[serde(rename = "BuySOL")]
    BuySol,
    #[serde(rename = "SellSOL")]
    SellSol,
    FeePayment,
    TokenTransfer,
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Swap => write!(f, "Swap"),
            TransactionType::BuySol => write!(f, "Buy SOL"),
            TransactionType::SellSol => write!(f, "Sell SOL"),
            TransactionType::FeePayment => write!(f, "Fee Payment"),
            TransactionType::TokenTransfer => write!(f, "Token Transfer"),
            TransactionType::Transfer => write!(f, "Transfer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAmount {
    pub asset_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedTransaction {
    pub signature: String,
    pub block_time: Option<i64>,
    /// Network fee in lamports
    pub fee: u64,
    pub transaction_type: TransactionType,
    pub spent_assets: Vec<AssetAmount>,
    pub received_assets: Vec<AssetAmount>,
}

/// Classifier for one stable/volatile pair
#[derive(Debug, Clone)]
pub struct TransactionClassifier {
    stable_mint: String,
    volatile_mint: String,
}

impl Default for TransactionClassifier {
    fn default() -> Self {
        Self::new(USDC_MINT.to_string(), SOL_MINT.to_string())
    }
}

impl TransactionClassifier {
    pub fn new(stable_mint: String, volatile_mint: String) -> Self {
        Self {
            stable_mint,
            volatile_mint,
        }
    }

    /// Classify `record` from the point of view of `owner`.
    pub fn classify(&self, record: &TransactionRecord, owner: &str) -> ClassifiedTransaction {
        let mut deltas = token_deltas(record, owner);
        let native_delta = native_delta_excluding_fee(record, owner);

        let tokens_moved = deltas.values().any(|d| !d.is_zero());
        let transaction_type;

        if native_delta.abs() < NATIVE_EPSILON && !tokens_moved {
            return ClassifiedTransaction {
                signature: record.signature.clone(),
                block_time: record.block_time,
                fee: record.fee,
                transaction_type: TransactionType::FeePayment,
                spent_assets: Vec::new(),
                received_assets: Vec::new(),
            };
        }

        // Native movement counts as the SOL asset, merged with any wrapped SOL delta
        if native_delta.abs() >= NATIVE_EPSILON {
            *deltas.entry(SOL_MINT.to_string()).or_default() += native_delta;
        }

        let (spent, received) = split_deltas(deltas);

        if !spent.is_empty() && !received.is_empty() {
            let spent_stable = spent.iter().any(|a| a.asset_id == self.stable_mint);
            let spent_volatile = spent.iter().any(|a| a.asset_id == self.volatile_mint);
            let got_stable = received.iter().any(|a| a.asset_id == self.stable_mint);
            let got_volatile = received.iter().any(|a| a.asset_id == self.volatile_mint);

            transaction_type = if spent_stable && got_volatile {
                TransactionType::BuySol
            } else if spent_volatile && got_stable {
                TransactionType::SellSol
            } else {
                TransactionType::Swap
            };
        } else if spent.len() == 1 && received.is_empty() {
            transaction_type = if spent[0].asset_id == SOL_MINT {
                TransactionType::Transfer
            } else {
                TransactionType::TokenTransfer
            };
        } else {
            transaction_type = TransactionType::Transfer;
        }

        ClassifiedTransaction {
            signature: record.signature.clone(),
            block_time: record.block_time,
            fee: record.fee,
            transaction_type,
            spent_assets: spent,
            received_assets: received,
        }
    }
}

fn owned_by(balance: &TokenBalance, owner: &str) -> bool {
    balance.owner.as_deref().map_or(true, |o| o == owner)
}

/// Net token change per mint for accounts held by `owner`.
///
/// Mints whose decimals cannot be represented are left out entirely.
fn token_deltas(record: &TransactionRecord, owner: &str) -> BTreeMap<String, Decimal> {
    let mut deltas: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut unrepresentable: BTreeSet<&str> = BTreeSet::new();

    let pre = record.pre_token_balances.iter().map(|b| (b, true));
    let post = record.post_token_balances.iter().map(|b| (b, false));

    for (balance, is_pre) in pre.chain(post).filter(|(b, _)| owned_by(b, owner)) {
        let Some(amount) = try_from_base_units(balance.amount, balance.decimals) else {
            if unrepresentable.insert(balance.mint.as_str()) {
                tracing::warn!(
                    signature = %record.signature,
                    mint = %balance.mint,
                    decimals = balance.decimals,
                    "Skipping token with unsupported decimals"
                );
            }
            continue;
        };

        let delta = deltas.entry(balance.mint.clone()).or_default();
        if is_pre {
            *delta -= amount;
        } else {
            *delta += amount;
        }
    }

    for mint in unrepresentable {
        deltas.remove(mint);
    }
    deltas
}

/// Native change of `owner` in SOL, with the fee added back if `owner` paid it
fn native_delta_excluding_fee(record: &TransactionRecord, owner: &str) -> Decimal {
    let Some(index) = record.account_index(owner) else {
        return Decimal::ZERO;
    };
    let (Some(&pre), Some(&post)) = (record.pre_balances.get(index), record.post_balances.get(index)) else {
        return Decimal::ZERO;
    };

    let mut delta = post as i128 - pre as i128;
    if index == 0 {
        delta += record.fee as i128;
    }
    from_signed_base_units(delta, SOL_DECIMALS)
}

fn split_deltas(deltas: BTreeMap<String, Decimal>) -> (Vec<AssetAmount>, Vec<AssetAmount>) {
    let mut spent = Vec::new();
    let mut received = Vec::new();

    for (asset_id, delta) in deltas {
        if delta.is_sign_negative() && !delta.is_zero() {
            spent.push(AssetAmount {
                asset_id,
                amount: delta.abs().normalize(),
            });
        } else if delta.is_sign_positive() && !delta.is_zero() {
            received.push(AssetAmount {
                asset_id,
                amount: delta.normalize(),
            });
        }
    }

    (spent, received)
}
