use async_trait::async_trait;
use solana_client::client_error::ClientErrorKind;
use solana_client::rpc_client::{GetConfirmedSignaturesForAddress2Config, RpcClient};
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig};
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, TransactionConfirmationStatus,
    UiLoadedAddresses, UiMessage, UiTransactionEncoding, UiTransactionTokenBalance,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{CommitmentTier, SignatureStatus, TokenBalance, TransactionRecord};
use crate::ports::ledger::{LedgerError, LedgerPort, SendOptions};

/// Wrapper around the Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    /// Create a client at `confirmed` commitment
    pub fn new(rpc_url: String) -> Self {
        Self::with_commitment(rpc_url, CommitmentConfig::confirmed(), Duration::from_secs(30))
    }

    pub fn with_commitment(rpc_url: String, commitment: CommitmentConfig, timeout: Duration) -> Self {
        let client = Arc::new(RpcClient::new_with_timeout_and_commitment(rpc_url, timeout, commitment));
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Run a blocking RPC call on the blocking pool
    async fn blocking<T, F>(&self, call: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: FnOnce(&RpcClient) -> Result<T, LedgerError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| LedgerError::Rpc(format!("Task join error: {}", e)))?
    }
}

fn parse_pubkey(address: &str) -> Result<Pubkey, LedgerError> {
    Pubkey::from_str(address).map_err(|e| LedgerError::InvalidAddress(format!("{}: {}", address, e)))
}

fn parse_signature(signature: &str) -> Result<Signature, LedgerError> {
    Signature::from_str(signature).map_err(|e| LedgerError::InvalidSignature(format!("{}: {}", signature, e)))
}

#[async_trait]
impl LedgerPort for SolanaClient {
    async fn get_native_balance(&self, owner: &str) -> Result<u64, LedgerError> {
        let pubkey = parse_pubkey(owner)?;
        self.blocking(move |client| {
            client
                .get_balance(&pubkey)
                .map_err(|e| LedgerError::Rpc(e.to_string()))
        })
        .await
    }

    async fn get_token_balance(&self, owner: &str, mint: &str) -> Result<u64, LedgerError> {
        let owner = parse_pubkey(owner)?;
        let mint = parse_pubkey(mint)?;

        let accounts = self
            .blocking(move |client| {
                client
                    .get_token_accounts_by_owner(&owner, TokenAccountsFilter::Mint(mint))
                    .map_err(|e| LedgerError::Rpc(e.to_string()))
            })
            .await?;

        let mut total: u64 = 0;
        for keyed in accounts {
            let data = serde_json::to_value(&keyed.account.data)
                .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
            let amount = data["parsed"]["info"]["tokenAmount"]["amount"]
                .as_str()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| {
                    LedgerError::InvalidResponse(format!("Token account {} is not jsonParsed", keyed.pubkey))
                })?;
            total = total.saturating_add(amount);
        }
        Ok(total)
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        options: SendOptions,
    ) -> Result<String, LedgerError> {
        let tx = transaction.clone();
        let config = RpcSendTransactionConfig {
            skip_preflight: options.skip_preflight,
            max_retries: Some(options.max_retries),
            ..RpcSendTransactionConfig::default()
        };

        self.blocking(move |client| {
            client
                .send_transaction_with_config(&tx, config)
                .map(|sig| sig.to_string())
                .map_err(|e| LedgerError::Rejected(e.to_string()))
        })
        .await
    }

    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>, LedgerError> {
        let signature = parse_signature(signature)?;

        let response = self
            .blocking(move |client| {
                client
                    .get_signature_statuses(&[signature])
                    .map_err(|e| LedgerError::Rpc(e.to_string()))
            })
            .await?;

        Ok(response.value.into_iter().next().flatten().map(|status| {
            let tier = match status.confirmation_status {
                Some(TransactionConfirmationStatus::Processed) => Some(CommitmentTier::Processed),
                Some(TransactionConfirmationStatus::Confirmed) => Some(CommitmentTier::Confirmed),
                Some(TransactionConfirmationStatus::Finalized) => Some(CommitmentTier::Finalized),
                // Older nodes: no confirmation count means rooted
                None if status.confirmations.is_none() => Some(CommitmentTier::Finalized),
                None => Some(CommitmentTier::Confirmed),
            };
            SignatureStatus {
                tier,
                error: status.err.map(|e| format!("{:?}", e)),
            }
        }))
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<TransactionRecord>, LedgerError> {
        let sig = parse_signature(signature)?;
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        let lookup = self
            .blocking(move |client| match client.get_transaction_with_config(&sig, config) {
                Ok(tx) => Ok(Some(tx)),
                // A `null` result fails to deserialize: the node does not know the signature yet
                Err(e) if matches!(e.kind(), ClientErrorKind::SerdeJson(_)) => Ok(None),
                Err(e) => Err(LedgerError::Rpc(e.to_string())),
            })
            .await?;

        lookup
            .map(|tx| record_from_encoded(signature.to_string(), tx))
            .transpose()
    }

    async fn get_signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<String>, LedgerError> {
        let pubkey = parse_pubkey(address)?;
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };

        let statuses = self
            .blocking(move |client| {
                client
                    .get_signatures_for_address_with_config(&pubkey, config)
                    .map_err(|e| LedgerError::Rpc(e.to_string()))
            })
            .await?;

        Ok(statuses.into_iter().map(|s| s.signature).collect())
    }
}

fn token_balances(balances: Option<Vec<UiTransactionTokenBalance>>) -> Result<Vec<TokenBalance>, LedgerError> {
    balances
        .unwrap_or_default()
        .into_iter()
        .map(|b| {
            let amount = b.ui_token_amount.amount.parse::<u64>().map_err(|e| {
                LedgerError::InvalidResponse(format!("Bad token amount '{}': {}", b.ui_token_amount.amount, e))
            })?;
            Ok(TokenBalance {
                account_index: b.account_index,
                mint: b.mint,
                owner: b.owner.into(),
                amount,
                decimals: b.ui_token_amount.decimals,
            })
        })
        .collect()
}

/// Reduce a `getTransaction` response to a [`TransactionRecord`].
pub(crate) fn record_from_encoded(
    signature: String,
    tx: EncodedConfirmedTransactionWithStatusMeta,
) -> Result<TransactionRecord, LedgerError> {
    let meta = tx
        .transaction
        .meta
        .ok_or_else(|| LedgerError::InvalidResponse(format!("Transaction {} has no metadata", signature)))?;

    let loaded: Option<UiLoadedAddresses> = meta.loaded_addresses.into();

    let account_keys = match tx.transaction.transaction {
        EncodedTransaction::Json(ui) => match ui.message {
            // jsonParsed already lists lookup-table keys after the static ones
            UiMessage::Parsed(message) => message.account_keys.into_iter().map(|k| k.pubkey).collect(),
            UiMessage::Raw(message) => {
                let mut keys = message.account_keys;
                if let Some(loaded) = loaded {
                    keys.extend(loaded.writable);
                    keys.extend(loaded.readonly);
                }
                keys
            }
        },
        EncodedTransaction::Accounts(list) => list.account_keys.into_iter().map(|k| k.pubkey).collect(),
        other => {
            let decoded = other.decode().ok_or_else(|| {
                LedgerError::InvalidResponse(format!("Cannot decode transaction {}", signature))
            })?;
            let mut keys: Vec<String> = decoded
                .message
                .static_account_keys()
                .iter()
                .map(|k| k.to_string())
                .collect();
            if let Some(loaded) = loaded {
                keys.extend(loaded.writable);
                keys.extend(loaded.readonly);
            }
            keys
        }
    };

    Ok(TransactionRecord {
        signature,
        slot: tx.slot,
        block_time: tx.block_time,
        fee: meta.fee,
        error: meta.err.map(|e| format!("{:?}", e)),
        account_keys,
        pre_balances: meta.pre_balances,
        post_balances: meta.post_balances,
        pre_token_balances: token_balances(meta.pre_token_balances.into())?,
        post_token_balances: token_balances(meta.post_token_balances.into())?,
    })
}
