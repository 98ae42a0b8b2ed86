//! Trade pipeline
//!
//! Signal -> Balance Oracle -> Quote -> Swap build -> Sign/Broadcast -> Confirm.
//! Each stage gates the next; the first failure ends the run.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::balance_oracle::BalanceOracle;
use super::error::TradeError;
use super::monitor::ConfirmationMonitor;
use super::submitter::TransactionSubmitter;
use crate::adapters::jupiter::{PrioritizationFee, PriorityLevel, QuoteRequest, SwapRequest, SwapResponse};
use crate::domain::{
    interpret, BalanceSnapshot, ConfirmationResult, ConfirmationStatus, Signal, SignalKind, TradeIntent,
    TradePolicy,
};
use crate::ports::SwapPort;

/// How swaps are requested from the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct SwapSettings {
    pub slippage_bps: u16,
    pub restrict_intermediate_tokens: bool,
    pub dynamic_compute_unit_limit: bool,
    pub dynamic_slippage: bool,
    pub priority_fee: Option<PrioritizationFee>,
}

impl Default for SwapSettings {
    fn default() -> Self {
        Self {
            slippage_bps: 50,
            restrict_intermediate_tokens: true,
            dynamic_compute_unit_limit: true,
            dynamic_slippage: true,
            priority_fee: Some(PrioritizationFee::capped(PriorityLevel::VeryHigh, 1_000_000)),
        }
    }
}

/// A finalized trade
#[derive(Debug, Clone, Serialize)]
pub struct TradeOutcome {
    pub signal: SignalKind,
    pub intent: TradeIntent,
    pub expected_out_amount: u64,
    pub signature: String,
    pub confirmation: ConfirmationResult,
}

pub struct TradePipeline {
    oracle: BalanceOracle,
    swaps: Arc<dyn SwapPort>,
    submitter: TransactionSubmitter,
    monitor: ConfirmationMonitor,
    policy: TradePolicy,
    settings: SwapSettings,
    /// Held for a whole run so two signals never trade off the same balances
    trade_lock: Mutex<()>,
}

impl TradePipeline {
    pub fn new(
        oracle: BalanceOracle,
        swaps: Arc<dyn SwapPort>,
        submitter: TransactionSubmitter,
        monitor: ConfirmationMonitor,
        policy: TradePolicy,
        settings: SwapSettings,
    ) -> Self {
        Self {
            oracle,
            swaps,
            submitter,
            monitor,
            policy,
            settings,
            trade_lock: Mutex::new(()),
        }
    }

    /// Address of the service wallet
    pub fn wallet_address(&self) -> String {
        self.submitter.public_key()
    }

    /// Current balances of the service wallet
    pub async fn wallet_balances(&self) -> Result<BalanceSnapshot, TradeError> {
        Ok(self.oracle.get_balances(&self.wallet_address()).await?)
    }

    /// Entry point for webhook bodies
    pub async fn handle_webhook(&self, payload: serde_json::Value) -> Result<TradeOutcome, TradeError> {
        let signal = Signal::from_payload(payload)?;
        self.execute(signal).await
    }

    /// Run one signal through every stage.
    pub async fn execute(&self, signal: Signal) -> Result<TradeOutcome, TradeError> {
        let _guard = self.trade_lock.lock().await;
        let owner = self.wallet_address();

        tracing::info!(signal = %signal.kind, wallet = %owner, "Processing signal");

        let snapshot = self.oracle.get_balances(&owner).await?;
        let intent = interpret(&signal, &snapshot, &self.policy)?;

        tracing::info!(
            from = %intent.from_asset_id,
            to = %intent.to_asset_id,
            amount = intent.amount_in_base_units,
            "Trade intent"
        );

        let quote_request = QuoteRequest::new(
            intent.from_asset_id.clone(),
            intent.to_asset_id.clone(),
            intent.amount_in_base_units,
            self.settings.slippage_bps,
        )
        .with_restricted_intermediates(self.settings.restrict_intermediate_tokens);

        let quote = self.swaps.get_quote(&quote_request).await?;
        let expected_out_amount = quote.output_amount();

        let quote_json = serde_json::to_value(&quote)
            .map_err(|e| TradeError::Upstream(format!("Quote could not be re-encoded: {}", e)))?;
        let swap = self.swaps.build_swap(&self.swap_request(owner, quote_json)).await?;

        let signature = self.submitter.sign_and_send(&swap.swap_transaction).await?;
        let confirmation = self.monitor.await_finality(&signature).await;

        match confirmation.status {
            ConfirmationStatus::Finalized => Ok(TradeOutcome {
                signal: signal.kind,
                intent,
                expected_out_amount,
                signature,
                confirmation,
            }),
            ConfirmationStatus::Failed => Err(TradeError::TransactionFailed {
                signature,
                reason: confirmation.error.unwrap_or_default(),
            }),
            _ => Err(TradeError::ConfirmationTimedOut {
                signature,
                attempts: confirmation.attempts_used,
            }),
        }
    }

    /// Build an unsigned swap for a client-supplied quote. Never signs.
    pub async fn build_unsigned_swap(
        &self,
        quote: serde_json::Value,
        user_public_key: String,
    ) -> Result<SwapResponse, TradeError> {
        if !quote.is_object() {
            return Err(TradeError::Validation("'quote' must be a quote response object".to_string()));
        }
        Ok(self.swaps.build_swap(&self.swap_request(user_public_key, quote)).await?)
    }

    fn swap_request(&self, user_public_key: String, quote: serde_json::Value) -> SwapRequest {
        let request = SwapRequest::new(user_public_key, quote)
            .with_dynamic_compute_limit(self.settings.dynamic_compute_unit_limit)
            .with_dynamic_slippage(self.settings.dynamic_slippage);

        match self.settings.priority_fee {
            Some(fee) => request.with_priority_fee(fee),
            None => request,
        }
    }
}
