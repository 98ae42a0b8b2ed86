use solana_sdk::{
    message::VersionedMessage,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::VersionedTransaction,
};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
}

/// Holder of the process signing key.
///
/// Deliberately not `Clone` and with a `Debug` that only shows the public key;
/// the secret never leaves this type.
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load keypair from a file path (JSON array format, as written by `solana-keygen`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read file: {}", e)))?;

        Self::from_json_str(&contents)
    }

    /// Load keypair from a JSON byte array such as `[12,34,...]`
    pub fn from_json_str(contents: &str) -> Result<Self, WalletError> {
        let bytes: Vec<u8> = serde_json::from_str(contents.trim())
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    /// Load keypair from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes)
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self { keypair })
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Sign `message` with the wallet key, producing a fresh transaction.
    ///
    /// Fails if the message requires signers other than this wallet.
    pub fn sign_versioned(&self, message: VersionedMessage) -> Result<VersionedTransaction, WalletError> {
        VersionedTransaction::try_new(message, &[&self.keypair])
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}
