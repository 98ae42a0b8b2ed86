//! Configuration Loader
//!
//! Loads and validates configuration from a TOML file shaped like
//! `config.example.toml`. Secrets and endpoints can be overridden from the
//! environment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::jupiter::{JupiterConfig, PrioritizationFee, PriorityLevel};
use crate::application::{HistoryLimits, MonitorConfig, SwapSettings};
use crate::domain::tokens::{SOL_DECIMALS, SOL_MINT, USDC_DECIMALS, USDC_MINT};
use crate::domain::TradePolicy;
use crate::ports::SendOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tokens: TokensSection,
    #[serde(default)]
    pub trading: TradingSection,
    #[serde(default)]
    pub jupiter: JupiterSection,
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub confirmation: ConfirmationSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Traded pair
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokensSection {
    /// Stable reference token (USDC)
    pub stable_mint: String,
    pub stable_decimals: u8,
    /// Volatile asset held natively (SOL)
    pub volatile_mint: String,
    pub volatile_decimals: u8,
}

impl Default for TokensSection {
    fn default() -> Self {
        Self {
            stable_mint: USDC_MINT.to_string(),
            stable_decimals: USDC_DECIMALS,
            volatile_mint: SOL_MINT.to_string(),
            volatile_decimals: SOL_DECIMALS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingSection {
    /// SOL kept back on bearish signals so fees can still be paid
    pub native_reserve: Decimal,
    /// Slippage tolerance in basis points (0.5% = 50 bps)
    pub slippage_bps: u16,
    pub restrict_intermediate_tokens: bool,
    /// "medium", "high" or "veryHigh"
    pub priority_level: PriorityLevel,
    /// Prioritization fee ceiling; 0 disables the priority fee
    pub max_priority_fee_lamports: u64,
    pub dynamic_compute_units: bool,
    pub dynamic_slippage: bool,
}

impl Default for TradingSection {
    fn default() -> Self {
        Self {
            native_reserve: dec!(0.01),
            slippage_bps: 50,
            restrict_intermediate_tokens: true,
            priority_level: PriorityLevel::VeryHigh,
            max_priority_fee_lamports: 1_000_000,
            dynamic_compute_units: true,
            dynamic_slippage: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl JupiterSection {
    /// API key from config, falling back to `JUPITER_API_KEY`
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("JUPITER_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    pub rpc_url: String,
    /// "processed", "confirmed" or "finalized"
    pub commitment: String,
    /// Wallet keypair path (NEVER commit this file!)
    pub keypair_path: String,
    /// `maxRetries` passed to `sendTransaction`
    pub broadcast_max_retries: usize,
    pub timeout_secs: u64,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            keypair_path: "~/.config/solana/id.json".to_string(),
            broadcast_max_retries: 2,
            timeout_secs: 30,
        }
    }
}

impl SolanaSection {
    /// RPC URL, `SOLANA_RPC_URL` wins over the file
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// Keypair path, `SOLANA_KEYPAIR_PATH` wins over the file
    pub fn get_keypair_path(&self) -> String {
        std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfirmationSection {
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for ConfirmationSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3,
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub history_default_limit: usize,
    pub history_max_limit: usize,
    pub history_concurrency: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            history_default_limit: 30,
            history_max_limit: 1000,
            history_concurrency: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "trace", "debug", "info", "warn" or "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.stable_mint.is_empty() {
            return Err(invalid("stable_mint cannot be empty".to_string()));
        }
        if self.tokens.volatile_mint.is_empty() {
            return Err(invalid("volatile_mint cannot be empty".to_string()));
        }
        if self.tokens.stable_mint == self.tokens.volatile_mint {
            return Err(invalid("stable_mint and volatile_mint must differ".to_string()));
        }
        // The volatile side is read as the wallet's native balance
        if self.tokens.volatile_mint != SOL_MINT || self.tokens.volatile_decimals != SOL_DECIMALS {
            return Err(invalid(format!(
                "volatile token must be native SOL ({}, {} decimals), got {} with {} decimals",
                SOL_MINT, SOL_DECIMALS, self.tokens.volatile_mint, self.tokens.volatile_decimals
            )));
        }
        for (name, decimals) in [
            ("stable_decimals", self.tokens.stable_decimals),
            ("volatile_decimals", self.tokens.volatile_decimals),
        ] {
            if decimals > 18 {
                return Err(invalid(format!("{} must be <= 18, got {}", name, decimals)));
            }
        }

        if self.trading.native_reserve.is_sign_negative() {
            return Err(invalid(format!(
                "native_reserve must be >= 0, got {}",
                self.trading.native_reserve
            )));
        }
        if self.trading.slippage_bps == 0 || self.trading.slippage_bps > 10_000 {
            return Err(invalid(format!(
                "slippage_bps must be 1-10000, got {}",
                self.trading.slippage_bps
            )));
        }

        if self.jupiter.api_url.is_empty() {
            return Err(invalid("jupiter.api_url cannot be empty".to_string()));
        }
        if self.jupiter.timeout_secs == 0 {
            return Err(invalid("jupiter.timeout_secs must be > 0".to_string()));
        }

        if self.solana.rpc_url.is_empty() {
            return Err(invalid("solana.rpc_url cannot be empty".to_string()));
        }
        if !matches!(self.solana.commitment.as_str(), "processed" | "confirmed" | "finalized") {
            return Err(invalid(format!(
                "solana.commitment must be processed, confirmed or finalized, got '{}'",
                self.solana.commitment
            )));
        }

        if self.confirmation.max_attempts == 0 {
            return Err(invalid("confirmation.max_attempts must be > 0".to_string()));
        }

        if self.server.bind.is_empty() {
            return Err(invalid("server.bind cannot be empty".to_string()));
        }
        if self.server.history_max_limit == 0 || self.server.history_concurrency == 0 {
            return Err(invalid(
                "history_max_limit and history_concurrency must be > 0".to_string(),
            ));
        }
        if self.server.history_default_limit == 0
            || self.server.history_default_limit > self.server.history_max_limit
        {
            return Err(invalid(format!(
                "history_default_limit must be 1-{}, got {}",
                self.server.history_max_limit, self.server.history_default_limit
            )));
        }

        Ok(())
    }

    pub fn trade_policy(&self) -> TradePolicy {
        TradePolicy {
            stable_mint: self.tokens.stable_mint.clone(),
            stable_decimals: self.tokens.stable_decimals,
            volatile_mint: self.tokens.volatile_mint.clone(),
            volatile_decimals: self.tokens.volatile_decimals,
            native_reserve: self.trading.native_reserve,
        }
    }

    pub fn swap_settings(&self) -> SwapSettings {
        let priority_fee = (self.trading.max_priority_fee_lamports > 0).then(|| {
            PrioritizationFee::capped(self.trading.priority_level, self.trading.max_priority_fee_lamports)
        });

        SwapSettings {
            slippage_bps: self.trading.slippage_bps,
            restrict_intermediate_tokens: self.trading.restrict_intermediate_tokens,
            dynamic_compute_unit_limit: self.trading.dynamic_compute_units,
            dynamic_slippage: self.trading.dynamic_slippage,
            priority_fee,
        }
    }

    pub fn jupiter_config(&self) -> JupiterConfig {
        JupiterConfig {
            api_base_url: self.jupiter.api_url.trim_end_matches('/').to_string(),
            api_key: self.jupiter.get_api_key(),
            timeout: Duration::from_secs(self.jupiter.timeout_secs),
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            max_attempts: self.confirmation.max_attempts,
            poll_interval: Duration::from_secs(self.confirmation.poll_interval_secs),
        }
    }

    /// RPC commitment; `validate` has already vetted the name
    pub fn commitment_config(&self) -> CommitmentConfig {
        match self.solana.commitment.as_str() {
            "processed" => CommitmentConfig::processed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        }
    }

    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            max_retries: self.solana.broadcast_max_retries,
            skip_preflight: true,
        }
    }

    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            default_limit: self.server.history_default_limit,
            max_limit: self.server.history_max_limit,
            concurrency: self.server.history_concurrency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[tokens]
stable_mint = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
stable_decimals = 6
volatile_mint = "So11111111111111111111111111111111111111112"
volatile_decimals = 9

[trading]
native_reserve = "0.02"
slippage_bps = 75
restrict_intermediate_tokens = true
priority_level = "high"
max_priority_fee_lamports = 500000
dynamic_compute_units = true
dynamic_slippage = false

[jupiter]
api_url = "https://api.jup.ag/swap/v1/"
timeout_secs = 15

[solana]
rpc_url = "https://api.mainnet-beta.solana.com"
commitment = "confirmed"
keypair_path = "~/.config/solana/id.json"
broadcast_max_retries = 3

[confirmation]
poll_interval_secs = 2
max_attempts = 15

[server]
bind = "127.0.0.1:8080"
history_default_limit = 20
history_max_limit = 200
history_concurrency = 4

[logging]
level = "debug"
"#
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.trading.native_reserve, dec!(0.02));
        assert_eq!(config.trading.slippage_bps, 75);
        assert_eq!(config.trading.priority_level, PriorityLevel::High);
        assert_eq!(config.confirmation.max_attempts, 15);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.tokens.stable_mint, USDC_MINT);
        assert_eq!(config.trading.native_reserve, dec!(0.01));
        assert_eq!(config.trading.slippage_bps, 50);
        assert_eq!(config.confirmation.max_attempts, 10);
        assert_eq!(config.confirmation.poll_interval_secs, 3);
        assert_eq!(config.solana.broadcast_max_retries, 2);
        assert_eq!(config.server.history_default_limit, 30);
    }

    #[test]
    fn test_example_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml");
        let config = load_config(path).unwrap();
        assert_eq!(config.trade_policy(), TradePolicy::default());
        assert_eq!(config.swap_settings(), SwapSettings::default());
        assert_eq!(config.commitment_config(), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[trading\nslippage_bps = ");
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases = [
            ("slippage_bps = 75", "slippage_bps = 0"),
            ("slippage_bps = 75", "slippage_bps = 10001"),
            ("native_reserve = \"0.02\"", "native_reserve = \"-1\""),
            ("max_attempts = 15", "max_attempts = 0"),
            ("stable_decimals = 6", "stable_decimals = 19"),
            ("commitment = \"confirmed\"", "commitment = \"recent\""),
            ("history_default_limit = 20", "history_default_limit = 500"),
            (
                "volatile_mint = \"So11111111111111111111111111111111111111112\"",
                "volatile_mint = \"EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v\"",
            ),
        ];

        for (from, to) in cases {
            let file = write_config(&create_valid_config().replace(from, to));
            let result = load_config(file.path());
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "expected validation error for '{}'",
                to
            );
        }
    }

    #[test]
    fn test_volatile_token_must_be_native_sol() {
        let bonk = create_valid_config().replace(
            "volatile_mint = \"So11111111111111111111111111111111111111112\"",
            "volatile_mint = \"DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263\"",
        );
        let err = load_config(write_config(&bonk).path()).unwrap_err();
        assert!(err.to_string().contains("native SOL"), "{}", err);

        let wrong_decimals = create_valid_config().replace("volatile_decimals = 9", "volatile_decimals = 6");
        assert!(matches!(
            load_config(write_config(&wrong_decimals).path()),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_priority_level_is_parse_error() {
        let file = write_config(&create_valid_config().replace("\"high\"", "\"ludicrous\""));
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_conversions() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        let policy = config.trade_policy();
        assert_eq!(policy.stable_mint, USDC_MINT);
        assert_eq!(policy.native_reserve, dec!(0.02));

        let settings = config.swap_settings();
        assert_eq!(settings.slippage_bps, 75);
        assert!(!settings.dynamic_slippage);
        assert_eq!(
            settings.priority_fee,
            Some(PrioritizationFee::capped(PriorityLevel::High, 500_000))
        );

        let monitor = config.monitor_config();
        assert_eq!(monitor.max_attempts, 15);
        assert_eq!(monitor.poll_interval, Duration::from_secs(2));

        assert_eq!(config.send_options().max_retries, 3);
        assert_eq!(config.history_limits().max_limit, 200);
        assert_eq!(config.jupiter_config().api_base_url, "https://api.jup.ag/swap/v1");
    }

    #[test]
    fn test_zero_priority_ceiling_disables_fee() {
        let file = write_config(
            &create_valid_config().replace("max_priority_fee_lamports = 500000", "max_priority_fee_lamports = 0"),
        );
        let config = load_config(file.path()).unwrap();
        assert!(config.swap_settings().priority_fee.is_none());
    }
}
