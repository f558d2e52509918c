//! Password storage in the system keychain.
//!
//! - macOS: Keychain Services
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Entries use service `wwpoints` and the account id as the user, so one
//! keychain item exists per configured account.

use keyring::Entry;
use tracing::{debug, warn};
use wwpoints_core::AccountId;

use crate::error::StoreError;

/// Keychain service name.
pub const SERVICE: &str = "wwpoints";

fn entry(account: &AccountId) -> Result<Entry, StoreError> {
    Ok(Entry::new(SERVICE, account.as_str())?)
}

/// Stores a password for an account, replacing any previous one.
///
/// # Errors
///
/// Returns `StoreError::Keychain` if the keychain rejects the write.
pub fn store_password(account: &AccountId, password: &str) -> Result<(), StoreError> {
    entry(account)?.set_password(password)?;
    debug!(account = %account, "Password stored in keychain");
    Ok(())
}

/// Reads an account's password; `None` if absent, empty, or unreadable.
pub fn get_password(account: &AccountId) -> Option<String> {
    let result = entry(account).and_then(|e| Ok(e.get_password()?));
    match result {
        Ok(password) if !password.is_empty() => Some(password),
        Ok(_) => None,
        Err(e) => {
            debug!(account = %account, error = %e, "No keychain password");
            None
        }
    }
}

/// Deletes an account's password. Deleting a missing entry is not an error.
///
/// # Errors
///
/// Returns `StoreError::Keychain` for failures other than a missing entry.
pub fn delete_password(account: &AccountId) -> Result<(), StoreError> {
    match entry(account)?.delete_credential() {
        Ok(()) => {
            debug!(account = %account, "Password deleted from keychain");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            warn!(account = %account, error = %e, "Failed to delete keychain password");
            Err(e.into())
        }
    }
}
