//! Balance Oracle
//!
//! Reads the wallet's native and stable-token balances for one trade decision.

use std::sync::Arc;

use crate::domain::tokens::from_base_units;
use crate::domain::{BalanceSnapshot, TradePolicy};
use crate::ports::{LedgerError, LedgerPort};

pub struct BalanceOracle {
    ledger: Arc<dyn LedgerPort>,
    token_mint: String,
    token_decimals: u8,
    native_decimals: u8,
}

impl BalanceOracle {
    pub fn new(ledger: Arc<dyn LedgerPort>, policy: &TradePolicy) -> Self {
        Self {
            ledger,
            token_mint: policy.stable_mint.clone(),
            token_decimals: policy.stable_decimals,
            native_decimals: policy.volatile_decimals,
        }
    }

    /// Fresh snapshot for `owner`. Both reads go to the node; nothing is cached.
    pub async fn get_balances(&self, owner: &str) -> Result<BalanceSnapshot, LedgerError> {
        let (lamports, token_units) = tokio::try_join!(
            self.ledger.get_native_balance(owner),
            self.ledger.get_token_balance(owner, &self.token_mint),
        )?;

        let snapshot = BalanceSnapshot::new(
            from_base_units(lamports, self.native_decimals),
            from_base_units(token_units, self.token_decimals),
        );

        tracing::debug!(
            owner,
            native = %snapshot.native_amount,
            token = %snapshot.token_amount,
            "Balances read"
        );
        Ok(snapshot)
    }
}
