//! Transaction history read path
//!
//! Lists recent signatures for an address, fetches each transaction and runs
//! it through the classifier. Shares only the ledger port with trading.

use std::str::FromStr;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use solana_sdk::pubkey::Pubkey;

use super::error::TradeError;
use crate::domain::{ClassifiedTransaction, TransactionClassifier};
use crate::ports::LedgerPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub default_limit: usize,
    pub max_limit: usize,
    /// Transaction lookups in flight at once
    pub concurrency: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            default_limit: 30,
            max_limit: 1000,
            concurrency: 8,
        }
    }
}

pub struct HistoryService {
    ledger: Arc<dyn LedgerPort>,
    classifier: TransactionClassifier,
    limits: HistoryLimits,
}

impl HistoryService {
    pub fn new(ledger: Arc<dyn LedgerPort>, classifier: TransactionClassifier, limits: HistoryLimits) -> Self {
        Self {
            ledger,
            classifier,
            limits,
        }
    }

    /// Parse a `limit` query value; absent means the default.
    pub fn resolve_limit(&self, raw: Option<&str>) -> Result<usize, TradeError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(self.limits.default_limit);
        };

        let limit: usize = raw
            .parse()
            .map_err(|_| TradeError::Validation(format!("'limit' must be a number, got '{}'", raw)))?;

        if limit == 0 || limit > self.limits.max_limit {
            return Err(TradeError::Validation(format!(
                "'limit' must be between 1 and {}, got {}",
                self.limits.max_limit, limit
            )));
        }
        Ok(limit)
    }

    /// Classified history of `address`, newest first.
    ///
    /// Signatures whose lookup fails or returns nothing are skipped.
    pub async fn history(&self, address: &str, limit: usize) -> Result<Vec<ClassifiedTransaction>, TradeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(TradeError::Validation("'address' is required".to_string()));
        }
        Pubkey::from_str(address)
            .map_err(|_| TradeError::Validation(format!("Invalid address '{}'", address)))?;

        let signatures = self.ledger.get_signatures_for_address(address, limit).await?;
        tracing::debug!(address, count = signatures.len(), "Fetched signatures");

        let ledger = &self.ledger;
        let records: Vec<_> = stream::iter(signatures)
            .map(|signature| async move {
                let lookup = ledger.get_transaction(&signature).await;
                (signature, lookup)
            })
            .buffered(self.limits.concurrency.max(1))
            .collect()
            .await;

        let mut classified = Vec::with_capacity(records.len());
        for (signature, lookup) in records {
            match lookup {
                Ok(Some(record)) => classified.push(self.classifier.classify(&record, address)),
                Ok(None) => tracing::debug!(%signature, "Transaction not found, skipping"),
                Err(e) => tracing::warn!(%signature, error = %e, "Transaction lookup failed, skipping"),
            }
        }
        Ok(classified)
    }
}
