//! trendswap - trend-signal driven swaps on Solana via Jupiter

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use trendswap::adapters::cli::{CliApp, Command, HistoryCmd, OutputFormat, QuoteCmd, ServeCmd, StatusCmd};
use trendswap::adapters::http::{self, AppState};
use trendswap::adapters::jupiter::{JupiterClient, QuoteRequest};
use trendswap::adapters::solana::{SolanaClient, WalletManager};
use trendswap::application::{
    BalanceOracle, ConfirmationMonitor, HistoryService, TradePipeline, TransactionSubmitter,
};
use trendswap::config::{load_config, Config};
use trendswap::domain::tokens::{from_base_units, to_base_units};
use trendswap::domain::TransactionClassifier;
use trendswap::ports::{LedgerPort, SwapPort};

/// Inline keypair (JSON byte array); wins over any keypair file
const KEYPAIR_ENV: &str = "TRENDSWAP_KEYPAIR";

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets go in .env, not in config.toml
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config_path = match &app.command {
        Command::Serve(cmd) => &cmd.config,
        Command::Status(cmd) => &cmd.config,
        Command::Quote(cmd) => &cmd.config,
        Command::History(cmd) => &cmd.config,
    };
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    init_logging(app.verbose, app.debug, &config.logging.level);

    match app.command {
        Command::Serve(cmd) => serve_command(cmd, config).await,
        Command::Status(cmd) => status_command(cmd, config).await,
        Command::Quote(cmd) => quote_command(cmd, config).await,
        Command::History(cmd) => history_command(cmd, config).await,
    }
}

/// `--debug` > `--verbose` > `RUST_LOG` > `logging.level`
fn init_logging(verbose: bool, debug: bool, configured: &str) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn solana_client(config: &Config) -> SolanaClient {
    SolanaClient::with_commitment(
        config.solana.get_rpc_url(),
        config.commitment_config(),
        Duration::from_secs(config.solana.timeout_secs),
    )
}

fn load_wallet(config: &Config) -> Result<WalletManager> {
    if let Ok(inline) = std::env::var(KEYPAIR_ENV) {
        if !inline.trim().is_empty() {
            return WalletManager::from_json_str(&inline)
                .map_err(|e| anyhow::anyhow!("Invalid keypair in {}: {}", KEYPAIR_ENV, e));
        }
    }

    let keypair_path = shellexpand::tilde(&config.solana.get_keypair_path()).to_string();
    load_wallet_with_context(&keypair_path)
}

/// Load wallet with helpful error messages
fn load_wallet_with_context(keypair_path: &str) -> Result<WalletManager> {
    let path = Path::new(keypair_path);

    if !path.exists() {
        bail!(
            "Wallet file not found: {}\n\n\
             A wallet is required to sign swaps.\n\n\
             To create a new wallet, run:\n  \
             solana-keygen new --outfile {}\n\n\
             Or set 'keypair_path' in your config.toml, SOLANA_KEYPAIR_PATH, or {}",
            keypair_path,
            keypair_path,
            KEYPAIR_ENV
        );
    }

    if let Err(e) = std::fs::metadata(path) {
        bail!(
            "Cannot access wallet file '{}': {}\n\n\
             Check file permissions and ensure the path is correct.",
            keypair_path,
            e
        );
    }

    WalletManager::from_file(keypair_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load wallet from '{}': {}\n\n\
             The file exists but may be corrupted or in the wrong format.\n\
             Expected format: JSON array of bytes (e.g., [1,2,3,...])",
            keypair_path,
            e
        )
    })
}

fn classifier(config: &Config) -> TransactionClassifier {
    TransactionClassifier::new(config.tokens.stable_mint.clone(), config.tokens.volatile_mint.clone())
}

async fn serve_command(cmd: ServeCmd, config: Config) -> Result<()> {
    let wallet = load_wallet(&config)?;
    let ledger: Arc<dyn LedgerPort> = Arc::new(solana_client(&config));
    let swaps: Arc<dyn SwapPort> =
        Arc::new(JupiterClient::with_config(config.jupiter_config()).context("Failed to create Jupiter client")?);
    let policy = config.trade_policy();

    tracing::info!(wallet = %wallet.public_key(), rpc = %config.solana.get_rpc_url(), "Starting trendswap");

    let pipeline = TradePipeline::new(
        BalanceOracle::new(Arc::clone(&ledger), &policy),
        swaps,
        TransactionSubmitter::new(wallet, Arc::clone(&ledger), config.send_options()),
        ConfirmationMonitor::new(Arc::clone(&ledger), config.monitor_config()),
        policy,
        config.swap_settings(),
    );
    let history = HistoryService::new(ledger, classifier(&config), config.history_limits());

    let bind = cmd.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    tracing::info!(addr = %bind, "Listening");

    http::serve(
        listener,
        AppState {
            pipeline: Arc::new(pipeline),
            history: Arc::new(history),
        },
    )
    .await
    .context("HTTP server error")?;

    tracing::info!("trendswap stopped");
    Ok(())
}

async fn status_command(cmd: StatusCmd, config: Config) -> Result<()> {
    let wallet = load_wallet(&config)?;
    let ledger: Arc<dyn LedgerPort> = Arc::new(solana_client(&config));
    let oracle = BalanceOracle::new(ledger, &config.trade_policy());

    let snapshot = oracle
        .get_balances(&wallet.public_key())
        .await
        .context("Failed to get balances")?;

    match cmd.format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "address": wallet.public_key(),
                "native_amount": snapshot.native_amount,
                "token_amount": snapshot.token_amount,
                "as_of": snapshot.as_of,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            println!("Wallet: {}", wallet.public_key());
            println!("SOL:    {}", snapshot.native_amount);
            println!("USDC:   {}", snapshot.token_amount);
            println!("As of:  {}", snapshot.as_of.to_rfc3339());
        }
    }

    Ok(())
}

/// Resolve a symbol or mint into (mint, decimals)
fn resolve_token(config: &Config, token: &str) -> Result<(String, u8)> {
    let tokens = &config.tokens;
    match token.to_ascii_uppercase().as_str() {
        "SOL" => Ok((tokens.volatile_mint.clone(), tokens.volatile_decimals)),
        "USDC" => Ok((tokens.stable_mint.clone(), tokens.stable_decimals)),
        _ if token == tokens.volatile_mint => Ok((tokens.volatile_mint.clone(), tokens.volatile_decimals)),
        _ if token == tokens.stable_mint => Ok((tokens.stable_mint.clone(), tokens.stable_decimals)),
        _ => bail!("Unsupported token '{}': expected SOL, USDC or a configured mint", token),
    }
}

async fn quote_command(cmd: QuoteCmd, config: Config) -> Result<()> {
    let (input_mint, input_decimals) = resolve_token(&config, &cmd.input_token)?;
    let (output_mint, output_decimals) = resolve_token(&config, &cmd.output_token)?;
    if input_mint == output_mint {
        bail!("Input and output tokens must differ");
    }

    let amount = to_base_units(cmd.amount, input_decimals)
        .filter(|a| *a > 0)
        .with_context(|| format!("Invalid amount {}", cmd.amount))?;
    let slippage = cmd.slippage.unwrap_or(config.trading.slippage_bps);

    let jupiter = JupiterClient::with_config(config.jupiter_config())?;
    let request = QuoteRequest::new(input_mint, output_mint, amount, slippage)
        .with_restricted_intermediates(config.trading.restrict_intermediate_tokens)
        .with_direct_routes(cmd.direct_only);

    let quote = jupiter.get_quote(&request).await.context("Failed to get quote")?;

    println!(
        "Quote: {} {} -> {} {}",
        from_base_units(quote.input_amount(), input_decimals),
        cmd.input_token,
        from_base_units(quote.output_amount(), output_decimals),
        cmd.output_token
    );
    println!(
        "Minimum received: {} {} ({} bps slippage)",
        from_base_units(quote.min_output_amount(), output_decimals),
        cmd.output_token,
        slippage
    );
    if let Some(impact) = quote.price_impact() {
        println!("Price impact: {}%", impact);
    }
    println!("Route: {}", quote.route_labels());

    Ok(())
}

async fn history_command(cmd: HistoryCmd, config: Config) -> Result<()> {
    let ledger: Arc<dyn LedgerPort> = Arc::new(solana_client(&config));
    let history = HistoryService::new(ledger, classifier(&config), config.history_limits());

    let raw_limit = cmd.limit.map(|l| l.to_string());
    let limit = history.resolve_limit(raw_limit.as_deref())?;
    let transactions = history.history(&cmd.address, limit).await?;

    match cmd.format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "transactions": transactions });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            for tx in &transactions {
                let when = tx
                    .block_time
                    .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {:<13} fee={}  {}", when, tx.transaction_type.to_string(), tx.fee, tx.signature);
                for asset in &tx.spent_assets {
                    println!("    - {} {}", asset.amount, asset.asset_id);
                }
                for asset in &tx.received_assets {
                    println!("    + {} {}", asset.amount, asset.asset_id);
                }
            }
            println!("{} transaction(s)", transactions.len());
        }
    }

    Ok(())
}
