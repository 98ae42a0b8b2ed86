//! HTTP Adapter
//!
//! axum surface over the application layer: the signal webhook, the
//! history read path, wallet balances and the unsigned swap builder.

mod error;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::application::{HistoryService, TradePipeline};

pub use error::ApiError;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TradePipeline>,
    pub history: Arc<HistoryService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/trade-signal", post(handlers::trade_signal))
        .route("/tradingview-webhook", post(handlers::trade_signal))
        .route("/transactions/history", get(handlers::transaction_history))
        .route("/balance", get(handlers::balance))
        .route("/swap/build", post(handlers::build_swap))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Serve until Ctrl+C
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutdown signal received");
        })
        .await
}
