use std::collections::HashMap;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;

use super::error::ApiError;
use super::AppState;

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::validation("No data received in request body"));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("Invalid JSON body: {}", e)))
}

/// `POST /trade-signal` and `POST /tradingview-webhook`
pub async fn trade_signal(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let payload = parse_body(&body)?;
    let outcome = state.pipeline.handle_webhook(payload).await?;

    Ok(Json(json!({
        "message": "Transaction successful",
        "signature": outcome.signature,
        "signal": outcome.signal,
        "intent": outcome.intent,
        "expectedOutAmount": outcome.expected_out_amount.to_string(),
        "confirmation": outcome.confirmation,
    })))
}

/// `GET /transactions/history?address=..&limit=..`
pub async fn transaction_history(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let address = params
        .get("address")
        .map(String::as_str)
        .unwrap_or_default();
    let limit = state.history.resolve_limit(params.get("limit").map(String::as_str))?;

    let transactions = state.history.history(address, limit).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

/// `GET /balance` for the service wallet
pub async fn balance(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = state.pipeline.wallet_balances().await?;

    Ok(Json(json!({
        "address": state.pipeline.wallet_address(),
        "native_amount": snapshot.native_amount,
        "token_amount": snapshot.token_amount,
        "as_of": snapshot.as_of,
    })))
}

/// `POST /swap/build`: unsigned transaction for client-side signing.
///
/// Accepts the quote as `quote` or `quoteResponse`.
pub async fn build_swap(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let mut payload = parse_body(&body)?;

    let quote = payload
        .get_mut("quote")
        .map(Value::take)
        .filter(|q| !q.is_null())
        .or_else(|| payload.get_mut("quoteResponse").map(Value::take).filter(|q| !q.is_null()))
        .ok_or_else(|| ApiError::validation("Missing quote or userPublicKey"))?;
    let user_public_key = payload
        .get("userPublicKey")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::validation("Missing quote or userPublicKey"))?;

    Pubkey::from_str(user_public_key)
        .map_err(|_| ApiError::validation(format!("Invalid userPublicKey '{}'", user_public_key)))?;

    let swap = state
        .pipeline
        .build_unsigned_swap(quote, user_public_key.to_string())
        .await?;

    Ok(Json(json!({ "swapTransaction": swap.swap_transaction })))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
