//! Trade Pipeline Integration Tests
//!
//! Wire the real application components against the in-memory ledger and
//! swap fakes:
//! 1. Signal rejection before any side effect
//! 2. Bullish/bearish runs through quote, swap, signing and confirmation
//! 3. Broadcast rejection, on-chain failure and confirmation timeout reporting
//! 4. One trade at a time per wallet; balance reads stay unblocked
//! 5. History classification over the same ledger
//!
//! All tests are deterministic (no real network calls).

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

use trendswap::adapters::solana::WalletManager;
use trendswap::application::{
    BalanceOracle, ConfirmationMonitor, HistoryLimits, HistoryService, MonitorConfig, SwapSettings, TradeError,
    TradePipeline, TransactionSubmitter,
};
use trendswap::domain::tokens::{SOL_MINT, USDC_MINT};
use trendswap::domain::{
    CommitmentTier, ConfirmationStatus, SignatureStatus, SignalKind, TokenBalance, TradePolicy,
    TransactionClassifier, TransactionRecord, TransactionType,
};
use trendswap::ports::mocks::{sample_quote, unsigned_transaction_base64, FakeLedger, FakeSwapService};
use trendswap::ports::{LedgerError, LedgerPort, SendOptions, SwapPort};

// ============================================================================
// Test Fixtures
// ============================================================================

const OWNER: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

fn finalized() -> SignatureStatus {
    SignatureStatus {
        tier: Some(CommitmentTier::Finalized),
        error: None,
    }
}

fn build_pipeline(ledger: &Arc<FakeLedger>, swaps: &Arc<FakeSwapService>, wallet: WalletManager) -> TradePipeline {
    let ledger_port: Arc<dyn LedgerPort> = Arc::clone(ledger) as Arc<dyn LedgerPort>;
    let swap_port: Arc<dyn SwapPort> = Arc::clone(swaps) as Arc<dyn SwapPort>;
    let policy = TradePolicy::default();

    TradePipeline::new(
        BalanceOracle::new(Arc::clone(&ledger_port), &policy),
        swap_port,
        TransactionSubmitter::new(wallet, Arc::clone(&ledger_port), SendOptions::default()),
        ConfirmationMonitor::new(
            ledger_port,
            MonitorConfig {
                max_attempts: 10,
                poll_interval: Duration::from_secs(3),
            },
        ),
        policy,
        SwapSettings::default(),
    )
}

fn token_balance(index: u8, mint: &str, owner: &str, amount: u64, decimals: u8) -> TokenBalance {
    TokenBalance {
        account_index: index,
        mint: mint.to_string(),
        owner: Some(owner.to_string()),
        amount,
        decimals,
    }
}

// ============================================================================
// Signal handling
// ============================================================================

#[tokio::test]
async fn test_unknown_indicator_has_no_side_effects() {
    let ledger = Arc::new(FakeLedger::new().with_balances(2_000_000_000, 50_000_000));
    let swaps = Arc::new(FakeSwapService::new());
    let pipeline = build_pipeline(&ledger, &swaps, WalletManager::new_random());

    let err = pipeline
        .handle_webhook(json!({ "indicator": "neutral" }))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::Validation(_)));
    assert!(ledger.get_calls().is_empty());
    assert!(swaps.quote_requests().is_empty());
    assert!(swaps.swap_requests().is_empty());
}

#[tokio::test]
async fn test_bearish_below_reserve_stops_before_quote() {
    let ledger = Arc::new(FakeLedger::new().with_balances(10_000_000, 0));
    let swaps = Arc::new(FakeSwapService::new());
    let pipeline = build_pipeline(&ledger, &swaps, WalletManager::new_random());

    let err = pipeline
        .handle_webhook(json!({ "indicator": "bearish" }))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::InsufficientBalance(_)));
    assert!(err.is_client_error());
    assert!(swaps.quote_requests().is_empty());
    assert_eq!(ledger.call_count("send_transaction"), 0);
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_bullish_converts_stable_balance_and_finalizes() {
    let wallet = WalletManager::new_random();
    let address = wallet.public_key();
    let ledger = Arc::new(
        FakeLedger::new()
            .with_balances(50_000_000, 100_000_000)
            .with_status(finalized()),
    );
    let swaps = Arc::new(
        FakeSwapService::new()
            .with_quote(sample_quote(USDC_MINT, SOL_MINT, 100_000_000, 690_000_000))
            .with_swap_transaction(unsigned_transaction_base64(&wallet.pubkey())),
    );
    let pipeline = build_pipeline(&ledger, &swaps, wallet);

    let outcome = assert_ok!(
        pipeline
            .handle_webhook(json!({ "indicator": "bullish", "ticker": "SOLUSDC" }))
            .await
    );

    assert_eq!(outcome.signal, SignalKind::Bullish);
    assert_eq!(outcome.intent.from_asset_id, USDC_MINT);
    assert_eq!(outcome.intent.to_asset_id, SOL_MINT);
    assert_eq!(outcome.intent.amount_in_base_units, 100_000_000);
    assert_eq!(outcome.expected_out_amount, 690_000_000);
    assert_eq!(outcome.confirmation.status, ConfirmationStatus::Finalized);

    let quotes = swaps.quote_requests();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].input_mint, USDC_MINT);
    assert_eq!(quotes[0].slippage_bps, 50);

    let builds = swaps.swap_requests();
    assert_eq!(builds[0].user_public_key, address);
    assert_eq!(builds[0].quote_response["outAmount"], "690000000");

    let sent = ledger.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].0.verify_with_results().iter().all(|ok| *ok));
    assert_eq!(sent[0].0.signatures[0].to_string(), outcome.signature);
    assert!(sent[0].1.skip_preflight);
}

#[tokio::test]
async fn test_bearish_keeps_fee_reserve() {
    let wallet = WalletManager::new_random();
    let ledger = Arc::new(FakeLedger::new().with_balances(1_500_000_000, 0).with_status(finalized()));
    let swaps = Arc::new(
        FakeSwapService::new()
            .with_quote(sample_quote(SOL_MINT, USDC_MINT, 1_490_000_000, 215_000_000))
            .with_swap_transaction(unsigned_transaction_base64(&wallet.pubkey())),
    );
    let pipeline = build_pipeline(&ledger, &swaps, wallet);

    let outcome = pipeline
        .handle_webhook(json!({ "indicator": "Bearish" }))
        .await
        .unwrap();

    assert_eq!(outcome.intent.amount_in_base_units, 1_490_000_000);
    assert_eq!(swaps.quote_requests()[0].amount, 1_490_000_000);
}

#[tokio::test]
async fn test_on_chain_failure_reports_signature() {
    let wallet = WalletManager::new_random();
    let ledger = Arc::new(
        FakeLedger::new()
            .with_balances(1_000_000_000, 0)
            .with_status(SignatureStatus {
                tier: Some(CommitmentTier::Confirmed),
                error: Some("InstructionError(3, Custom(6001))".to_string()),
            }),
    );
    let swaps = Arc::new(
        FakeSwapService::new()
            .with_quote(sample_quote(SOL_MINT, USDC_MINT, 990_000_000, 140_000_000))
            .with_swap_transaction(unsigned_transaction_base64(&wallet.pubkey())),
    );
    let pipeline = build_pipeline(&ledger, &swaps, wallet);

    let err = pipeline
        .handle_webhook(json!({ "indicator": "bearish" }))
        .await
        .unwrap_err();

    match &err {
        TradeError::TransactionFailed { reason, .. } => assert!(reason.contains("6001")),
        other => panic!("Expected TransactionFailed, got {:?}", other),
    }
    let sent = ledger.sent_transactions();
    assert_eq!(err.signature(), Some(sent[0].0.signatures[0].to_string().as_str()));
    assert!(!err.is_client_error());
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_signature_times_out() {
    let wallet = WalletManager::new_random();
    let ledger = Arc::new(FakeLedger::new().with_balances(1_000_000_000, 0));
    let swaps = Arc::new(
        FakeSwapService::new()
            .with_quote(sample_quote(SOL_MINT, USDC_MINT, 990_000_000, 140_000_000))
            .with_swap_transaction(unsigned_transaction_base64(&wallet.pubkey())),
    );
    let pipeline = build_pipeline(&ledger, &swaps, wallet);

    let err = pipeline
        .handle_webhook(json!({ "indicator": "bearish" }))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::ConfirmationTimedOut { attempts: 10, .. }));
    assert!(err.signature().is_some());
    assert_eq!(ledger.call_count("get_signature_status"), 10);
    assert_eq!(ledger.call_count("send_transaction"), 1);
}

#[tokio::test]
async fn test_broadcast_rejection_skips_confirmation() {
    let wallet = WalletManager::new_random();
    let ledger = Arc::new(
        FakeLedger::new()
            .with_balances(1_000_000_000, 0)
            .with_send_error(LedgerError::Rejected("Blockhash not found".to_string())),
    );
    let swaps = Arc::new(
        FakeSwapService::new()
            .with_quote(sample_quote(SOL_MINT, USDC_MINT, 990_000_000, 140_000_000))
            .with_swap_transaction(unsigned_transaction_base64(&wallet.pubkey())),
    );
    let pipeline = build_pipeline(&ledger, &swaps, wallet);

    let err = assert_err!(pipeline.handle_webhook(json!({ "indicator": "bearish" })).await);

    assert!(matches!(err, TradeError::BroadcastFailed(_)), "{:?}", err);
    assert!(err.to_string().contains("Blockhash not found"));
    assert_eq!(err.signature(), None);
    assert_eq!(err.kind(), "broadcast_failed");
    assert_eq!(ledger.call_count("send_transaction"), 1);
    assert_eq!(ledger.call_count("get_signature_status"), 0);
    assert_eq!(ledger.call_count("get_transaction"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_second_signal_waits_and_rereads_balances() {
    let wallet = WalletManager::new_random();
    let ledger = Arc::new(FakeLedger::new().with_balances(1_000_000_000, 0));
    let swaps = Arc::new(
        FakeSwapService::new()
            .with_quote(sample_quote(SOL_MINT, USDC_MINT, 990_000_000, 140_000_000))
            .with_swap_transaction(unsigned_transaction_base64(&wallet.pubkey())),
    );
    let pipeline = build_pipeline(&ledger, &swaps, wallet);
    let start = Instant::now();

    let first = pipeline.handle_webhook(json!({ "indicator": "bearish" }));
    let second = pipeline.handle_webhook(json!({ "indicator": "bearish" }));
    let balance_read = async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        // The first swap has drained the wallet by now
        ledger.set_balances(5_000_000, 0);
        let snapshot = pipeline.wallet_balances().await;
        (start.elapsed(), snapshot)
    };

    let (first, second, (read_after, snapshot)) = tokio::join!(first, second, balance_read);

    // Balance reads never wait for the trade in flight
    assert!(read_after < Duration::from_secs(27), "{:?}", read_after);
    assert_eq!(assert_ok!(snapshot).native_amount, dec!(0.005));

    assert!(matches!(first, Err(TradeError::ConfirmationTimedOut { attempts: 10, .. })));
    assert!(matches!(second, Err(TradeError::InsufficientBalance(_))), "{:?}", second);
    assert_eq!(swaps.quote_requests().len(), 1);
    assert_eq!(ledger.call_count("send_transaction"), 1);

    let calls = ledger.get_calls();
    let status_polls: Vec<usize> = positions(&calls, "get_signature_status");
    let native_reads: Vec<usize> = positions(&calls, "get_native_balance");
    assert_eq!(status_polls.len(), 10);
    assert_eq!(native_reads.len(), 3);
    // first run, the concurrent balance read, then the second run
    assert!(native_reads[1] < status_polls[9]);
    assert!(native_reads[2] > status_polls[9]);
}

fn positions(calls: &[String], method: &str) -> Vec<usize> {
    calls
        .iter()
        .enumerate()
        .filter(|(_, c)| c.as_str() == method)
        .map(|(i, _)| i)
        .collect()
}

#[tokio::test]
async fn test_missing_quote_stops_before_signing() {
    let ledger = Arc::new(FakeLedger::new().with_balances(1_000_000_000, 0));
    let swaps = Arc::new(FakeSwapService::new());
    let pipeline = build_pipeline(&ledger, &swaps, WalletManager::new_random());

    let err = pipeline
        .handle_webhook(json!({ "indicator": "bearish" }))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::Upstream(_)));
    assert!(swaps.swap_requests().is_empty());
    assert_eq!(ledger.call_count("send_transaction"), 0);
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn test_history_classifies_buy_and_skips_missing() {
    let buy = TransactionRecord {
        signature: "buy-sig".to_string(),
        slot: 300_000_000,
        block_time: Some(1_736_000_000),
        fee: 5_000,
        error: None,
        account_keys: vec![OWNER.to_string(), "TokenAccount1111111111111111111111111111111".to_string()],
        pre_balances: vec![2_000_000_000, 2_039_280],
        post_balances: vec![2_499_995_000, 2_039_280],
        pre_token_balances: vec![token_balance(1, USDC_MINT, OWNER, 100_000_000, 6)],
        post_token_balances: vec![token_balance(1, USDC_MINT, OWNER, 25_000_000, 6)],
    };
    let ledger = Arc::new(
        FakeLedger::new()
            .with_transaction(buy)
            .with_unknown_signature("dropped-sig"),
    );
    let history = HistoryService::new(
        ledger as Arc<dyn LedgerPort>,
        TransactionClassifier::default(),
        HistoryLimits::default(),
    );

    let transactions = history.history(OWNER, 30).await.unwrap();

    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.signature, "buy-sig");
    assert_eq!(tx.transaction_type, TransactionType::BuySol);
    assert_eq!(tx.fee, 5_000);
    assert_eq!(tx.spent_assets.len(), 1);
    assert_eq!(tx.spent_assets[0].asset_id, USDC_MINT);
    assert_eq!(tx.spent_assets[0].amount, dec!(75));
    assert_eq!(tx.received_assets[0].asset_id, SOL_MINT);
    assert_eq!(tx.received_assets[0].amount, dec!(0.5));

    let body = serde_json::to_value(tx).unwrap();
    assert_eq!(body["transactionType"], "BuySOL");
}

#[tokio::test]
async fn test_history_rejects_invalid_address() {
    let ledger = Arc::new(FakeLedger::new());
    let history = HistoryService::new(
        Arc::clone(&ledger) as Arc<dyn LedgerPort>,
        TransactionClassifier::default(),
        HistoryLimits::default(),
    );

    let err = assert_err!(history.history("not-an-address", 10).await);

    assert!(matches!(err, TradeError::Validation(_)));
    assert!(ledger.get_calls().is_empty());
}
