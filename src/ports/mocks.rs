//! Recording fakes for the ports, used by integration tests and local runs.
//!
//! Each fake records every call so tests can assert on what reached the
//! outside world (and what did not).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use base64::Engine;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    system_instruction,
    transaction::VersionedTransaction,
};

use crate::adapters::jupiter::{QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo, SwapRequest, SwapResponse};
use crate::domain::{SignatureStatus, TransactionRecord};
use crate::ports::execution::{ExecutionError, SwapPort};
use crate::ports::ledger::{LedgerError, LedgerPort, SendOptions};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Base64 of an unsigned single-signer transaction paid by `payer`,
/// shaped like what `/swap` returns.
pub fn unsigned_transaction_base64(payer: &Pubkey) -> String {
    let ix = system_instruction::transfer(payer, &Pubkey::new_unique(), 1_000);
    let message = Message::new_with_blockhash(&[ix], Some(payer), &Hash::new_unique());
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::Legacy(message),
    };
    let bytes = bincode::serialize(&tx).unwrap_or_default();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// A routable quote for `amount` of `input` into `out_amount` of `output`
pub fn sample_quote(input: &str, output: &str, amount: u64, out_amount: u64) -> QuoteResponse {
    QuoteResponse {
        input_mint: input.to_string(),
        output_mint: output.to_string(),
        in_amount: amount.to_string(),
        out_amount: out_amount.to_string(),
        other_amount_threshold: (out_amount - out_amount / 200).to_string(),
        swap_mode: "ExactIn".to_string(),
        slippage_bps: 50,
        price_impact_pct: Some("0".to_string()),
        route_plan: vec![RoutePlanStep {
            swap_info: SwapInfo {
                amm_key: "Czfq3xZZDmsdGdUyrNLtRhGc47cXcZtLG4crryfu44zE".to_string(),
                label: Some("Whirlpool".to_string()),
                input_mint: input.to_string(),
                output_mint: output.to_string(),
                in_amount: amount.to_string(),
                out_amount: out_amount.to_string(),
                fee_amount: None,
                fee_mint: None,
            },
            percent: 100,
            extra: HashMap::new(),
        }],
        context_slot: Some(312_000_000),
        time_taken: None,
        extra: HashMap::new(),
    }
}

/// In-memory ledger with configurable balances, statuses and history
#[derive(Debug, Default)]
pub struct FakeLedger {
    calls: Arc<Mutex<Vec<String>>>,
    native_balance: Mutex<u64>,
    token_balance: Mutex<u64>,
    balance_error: Mutex<Option<LedgerError>>,
    send_error: Mutex<Option<LedgerError>>,
    status: Mutex<Option<SignatureStatus>>,
    transactions: Mutex<HashMap<String, TransactionRecord>>,
    signatures: Mutex<Vec<String>>,
    sent: Mutex<Vec<(VersionedTransaction, SendOptions)>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(self, lamports: u64, token_base_units: u64) -> Self {
        *lock(&self.native_balance) = lamports;
        *lock(&self.token_balance) = token_base_units;
        self
    }

    pub fn with_balance_error(self, error: LedgerError) -> Self {
        *lock(&self.balance_error) = Some(error);
        self
    }

    pub fn with_send_error(self, error: LedgerError) -> Self {
        *lock(&self.send_error) = Some(error);
        self
    }

    /// Status returned for every signature
    pub fn with_status(self, status: SignatureStatus) -> Self {
        *lock(&self.status) = Some(status);
        self
    }

    /// Add a transaction to the history of every address
    pub fn with_transaction(self, record: TransactionRecord) -> Self {
        lock(&self.signatures).push(record.signature.clone());
        lock(&self.transactions).insert(record.signature.clone(), record);
        self
    }

    /// Add a signature whose full lookup returns nothing
    pub fn with_unknown_signature(self, signature: &str) -> Self {
        lock(&self.signatures).push(signature.to_string());
        self
    }

    pub fn set_balances(&self, lamports: u64, token_base_units: u64) {
        *lock(&self.native_balance) = lamports;
        *lock(&self.token_balance) = token_base_units;
    }

    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.as_str() == method).count()
    }

    pub fn sent_transactions(&self) -> Vec<(VersionedTransaction, SendOptions)> {
        lock(&self.sent).clone()
    }

    fn record(&self, method: &str) {
        lock(&self.calls).push(method.to_string());
    }
}

#[async_trait]
impl LedgerPort for FakeLedger {
    async fn get_native_balance(&self, _owner: &str) -> Result<u64, LedgerError> {
        self.record("get_native_balance");
        if let Some(err) = lock(&self.balance_error).clone() {
            return Err(err);
        }
        Ok(*lock(&self.native_balance))
    }

    async fn get_token_balance(&self, _owner: &str, _mint: &str) -> Result<u64, LedgerError> {
        self.record("get_token_balance");
        if let Some(err) = lock(&self.balance_error).clone() {
            return Err(err);
        }
        Ok(*lock(&self.token_balance))
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> Result<String, LedgerError> {
        self.record("send_transaction");
        if let Some(err) = lock(&self.send_error).clone() {
            return Err(err);
        }
        lock(&self.sent).push((transaction.clone(), options));
        Ok(transaction
            .signatures
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default())
    }

    async fn get_signature_status(&self, _signature: &str) -> Result<Option<SignatureStatus>, LedgerError> {
        self.record("get_signature_status");
        Ok(lock(&self.status).clone())
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        self.record("get_transaction");
        Ok(lock(&self.transactions).get(signature).cloned())
    }

    async fn get_signatures_for_address(&self, _address: &str, limit: usize) -> Result<Vec<String>, LedgerError> {
        self.record("get_signatures_for_address");
        Ok(lock(&self.signatures).iter().take(limit).cloned().collect())
    }
}

/// Swap service fake returning a canned quote and transaction
#[derive(Debug, Default)]
pub struct FakeSwapService {
    quote: Mutex<Option<QuoteResponse>>,
    swap_transaction: Mutex<Option<String>>,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    swap_requests: Mutex<Vec<SwapRequest>>,
}

impl FakeSwapService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, quote: QuoteResponse) -> Self {
        *lock(&self.quote) = Some(quote);
        self
    }

    pub fn with_swap_transaction(self, base64_tx: String) -> Self {
        *lock(&self.swap_transaction) = Some(base64_tx);
        self
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        lock(&self.quote_requests).clone()
    }

    pub fn swap_requests(&self) -> Vec<SwapRequest> {
        lock(&self.swap_requests).clone()
    }
}

#[async_trait]
impl SwapPort for FakeSwapService {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        lock(&self.quote_requests).push(request.clone());
        lock(&self.quote)
            .clone()
            .ok_or_else(|| ExecutionError::QuoteUnavailable("No quote configured".to_string()))
    }

    async fn build_swap(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError> {
        lock(&self.swap_requests).push(request.clone());
        lock(&self.swap_transaction)
            .clone()
            .map(|swap_transaction| SwapResponse {
                swap_transaction,
                last_valid_block_height: 279_632_475,
                prioritization_fee_lamports: 0,
            })
            .ok_or_else(|| ExecutionError::SwapBuildFailed("No transaction configured".to_string()))
    }
}
