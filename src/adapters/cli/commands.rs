//! CLI Commands
//!
//! Argument definitions for every trendswap subcommand. Execution lives in
//! the binary, which owns component wiring.

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// trendswap - trend signals in, Jupiter swaps out
#[derive(Parser, Debug)]
#[command(
    name = "trendswap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Trend-signal driven SOL/USDC swaps via Jupiter",
    long_about = "trendswap listens for bullish/bearish webhook signals, converts the wallet's \
                  balance into a Jupiter swap, signs and broadcasts it, and waits for \
                  finality. It also serves a classified transaction history for any address."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service
    Serve(ServeCmd),

    /// Show the service wallet and its balances
    Status(StatusCmd),

    /// Get a quote for a token swap
    Quote(QuoteCmd),

    /// Print the classified transaction history of an address
    History(HistoryCmd),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the bind address (e.g. 127.0.0.1:3000)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Input token (SOL, USDC or a mint address)
    #[arg(value_name = "INPUT")]
    pub input_token: String,

    /// Output token (SOL, USDC or a mint address)
    #[arg(value_name = "OUTPUT")]
    pub output_token: String,

    /// Amount of the input token, in UI units
    #[arg(value_name = "AMOUNT")]
    pub amount: Decimal,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Slippage tolerance in basis points (defaults to trading.slippage_bps)
    #[arg(long, value_name = "BPS")]
    pub slippage: Option<u16>,

    /// Only use direct routes (no multi-hop)
    #[arg(long)]
    pub direct_only: bool,
}

#[derive(Parser, Debug)]
pub struct HistoryCmd {
    /// Wallet address to inspect
    #[arg(value_name = "ADDRESS")]
    pub address: String,

    /// Number of signatures to fetch (defaults to server.history_default_limit)
    #[arg(short, long, value_name = "N")]
    pub limit: Option<usize>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_app_parse_serve() {
        let args = vec!["trendswap", "serve", "--config", "test.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("test.toml"));
                assert!(cmd.bind.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_app_parse_serve_with_bind() {
        let args = vec!["trendswap", "serve", "--bind", "127.0.0.1:8080"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("config.toml"));
                assert_eq!(cmd.bind.as_deref(), Some("127.0.0.1:8080"));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_app_parse_status() {
        let args = vec!["trendswap", "status", "--format", "json"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Status(cmd) => assert_eq!(cmd.format, OutputFormat::Json),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_app_parse_quote() {
        let args = vec!["trendswap", "quote", "SOL", "USDC", "1.25"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Quote(cmd) => {
                assert_eq!(cmd.input_token, "SOL");
                assert_eq!(cmd.output_token, "USDC");
                assert_eq!(cmd.amount, dec!(1.25));
                assert!(cmd.slippage.is_none());
                assert!(!cmd.direct_only);
            }
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_app_parse_quote_with_slippage() {
        let args = vec!["trendswap", "quote", "USDC", "SOL", "10", "--slippage", "100", "--direct-only"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Quote(cmd) => {
                assert_eq!(cmd.slippage, Some(100));
                assert!(cmd.direct_only);
            }
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_app_parse_quote_rejects_bad_amount() {
        let args = vec!["trendswap", "quote", "SOL", "USDC", "lots"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_app_parse_history() {
        let args = vec![
            "trendswap",
            "history",
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
            "--limit",
            "5",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::History(cmd) => {
                assert_eq!(cmd.address, "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM");
                assert_eq!(cmd.limit, Some(5));
                assert_eq!(cmd.format, OutputFormat::Text);
            }
            _ => panic!("Expected History command"),
        }
    }

    #[test]
    fn test_cli_app_global_flags() {
        let args = vec!["trendswap", "status", "--verbose"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.verbose);
        assert!(!app.debug);

        let args = vec!["trendswap", "--debug", "serve"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.debug);
    }

    #[test]
    fn test_cli_app_requires_command() {
        let args = vec!["trendswap"];
        assert!(CliApp::try_parse_from(args).is_err());
    }
}
