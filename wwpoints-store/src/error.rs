//! Store error types.

use thiserror::Error;
use wwpoints_core::{AccountId, CoreError};

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An account with the same id is already configured.
    #[error("Account already configured: {0}")]
    DuplicateAccount(AccountId),

    /// No account with this id is configured.
    #[error("Account not configured: {0}")]
    AccountNotFound(String),

    /// Neither the config nor the keychain holds a password.
    #[error("No password stored for {0}")]
    MissingPassword(AccountId),

    /// Invalid account fields.
    #[error(transparent)]
    Account(#[from] CoreError),

    /// Keychain access failed.
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if the user has to fix credentials.
    pub fn is_credentials(&self) -> bool {
        matches!(self, Self::MissingPassword(_) | Self::Account(_))
    }
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        Self::Keychain(err.to_string())
    }
}
