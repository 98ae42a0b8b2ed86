//! Jupiter API Client
//!
//! HTTP client for the Jupiter swap API (`/quote` and `/swap`).
//! Every call is a single attempt; the pipeline decides what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};
use crate::ports::execution::{ExecutionError, SwapPort};

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for Jupiter API
    pub api_base_url: String,
    /// Optional API key, sent as `x-api-key`
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    pub fn new() -> Result<Self, ExecutionError> {
        Self::with_config(JupiterConfig::default())
    }

    pub fn with_config(config: JupiterConfig) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExecutionError::InvalidParameters(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("x-api-key", api_key),
            None => req,
        }
    }

    /// Send the request and decode a JSON body, mapping any failure through `err`
    async fn send_json<T, F>(&self, req: RequestBuilder, err: F) -> Result<T, ExecutionError>
    where
        T: DeserializeOwned,
        F: Fn(String) -> ExecutionError,
    {
        let response = req.send().await.map_err(|e| err(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(err("Rate limit exceeded".to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(err(format!("API error {}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| err(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SwapPort for JupiterClient {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        let url = format!("{}/quote", self.config.api_base_url);
        let req = self.authorize(self.http.get(&url).query(&request.query_pairs()));

        tracing::debug!(
            input = %request.input_mint,
            output = %request.output_mint,
            amount = request.amount,
            slippage_bps = request.slippage_bps,
            "Requesting Jupiter quote"
        );

        let quote: QuoteResponse = self.send_json(req, ExecutionError::QuoteUnavailable).await?;

        if !quote.is_routable() {
            return Err(ExecutionError::QuoteUnavailable(format!(
                "No route for {} {} -> {}",
                request.amount, request.input_mint, request.output_mint
            )));
        }

        tracing::debug!(
            out_amount = quote.output_amount(),
            route = %quote.route_labels(),
            "Quote received"
        );
        Ok(quote)
    }

    async fn build_swap(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError> {
        let url = format!("{}/swap", self.config.api_base_url);
        let req = self.authorize(self.http.post(&url).json(request));

        let swap: SwapResponse = self.send_json(req, ExecutionError::SwapBuildFailed).await?;

        if swap.swap_transaction.is_empty() {
            return Err(ExecutionError::SwapBuildFailed(
                "Response did not contain a transaction".to_string(),
            ));
        }
        Ok(swap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jupiter_config_default() {
        let config = JupiterConfig::default();
        assert_eq!(config.api_base_url, "https://api.jup.ag/swap/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_jupiter_client_with_api_key() {
        let config = JupiterConfig {
            api_key: Some("test-key".to_string()),
            ..JupiterConfig::default()
        };
        let client = JupiterClient::with_config(config).unwrap();
        assert_eq!(client.api_base_url(), "https://api.jup.ag/swap/v1");

        let req = client.authorize(client.http.get("http://localhost/quote")).build().unwrap();
        assert_eq!(req.headers()["x-api-key"], "test-key");
    }

    #[test]
    fn test_no_api_key_header_by_default() {
        let client = JupiterClient::new().unwrap();
        let req = client.authorize(client.http.get("http://localhost/quote")).build().unwrap();
        assert!(req.headers().get("x-api-key").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_quote_unavailable() {
        let config = JupiterConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..JupiterConfig::default()
        };
        let client = JupiterClient::with_config(config).unwrap();
        let request = QuoteRequest::new("a".to_string(), "b".to_string(), 1, 50);

        let result = client.get_quote(&request).await;
        assert!(matches!(result, Err(ExecutionError::QuoteUnavailable(_))));
    }
}
