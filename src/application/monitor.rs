//! Confirmation Monitor
//!
//! Polls a broadcast signature until it is finalized, fails, or the attempt
//! budget runs out. Each attempt asks for the cheap status first and falls
//! back to a full transaction lookup.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ConfirmationResult;
use crate::ports::LedgerPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            poll_interval: Duration::from_secs(3),
        }
    }
}

enum Probe {
    Finalized,
    Failed(String),
    Pending,
}

pub struct ConfirmationMonitor {
    ledger: Arc<dyn LedgerPort>,
    config: MonitorConfig,
}

impl ConfirmationMonitor {
    pub fn new(ledger: Arc<dyn LedgerPort>, config: MonitorConfig) -> Self {
        Self { ledger, config }
    }

    /// Poll `signature` until it reaches a terminal state.
    ///
    /// Never errors: lookup failures count as a spent attempt.
    pub async fn await_finality(&self, signature: &str) -> ConfirmationResult {
        let mut result = ConfirmationResult::submitted(signature.to_string());

        for attempt in 1..=self.config.max_attempts {
            result = result.pending(attempt);

            match self.probe(signature).await {
                Probe::Finalized => {
                    tracing::info!(signature, attempt, "Transaction finalized");
                    return result.finalized();
                }
                Probe::Failed(reason) => {
                    tracing::warn!(signature, attempt, %reason, "Transaction failed on-chain");
                    return result.failed(reason);
                }
                Probe::Pending => {
                    tracing::debug!(
                        signature,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        "Not finalized yet"
                    );
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        tracing::warn!(
            signature,
            attempts = self.config.max_attempts,
            "Gave up waiting for finality"
        );
        result.timed_out()
    }

    async fn probe(&self, signature: &str) -> Probe {
        match self.ledger.get_signature_status(signature).await {
            Ok(Some(status)) => {
                if let Some(error) = status.error {
                    return Probe::Failed(error);
                }
                if status.is_finalized() {
                    return Probe::Finalized;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(signature, error = %e, "Status lookup failed"),
        }

        match self.ledger.get_transaction(signature).await {
            Ok(Some(record)) => match record.error {
                None => Probe::Finalized,
                Some(error) => Probe::Failed(error),
            },
            Ok(None) => Probe::Pending,
            Err(e) => {
                tracing::warn!(signature, error = %e, "Transaction lookup failed");
                Probe::Pending
            }
        }
    }
}
