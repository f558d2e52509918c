//! Configuration management.
//!
//! One JSON file lists the accounts to poll plus a few general settings.
//! Passwords may live in the file or, when omitted there, in the keychain.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use wwpoints_core::{Account, AccountId, Region};
use wwpoints_fetch::{DEFAULT_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS, PollSettings, ReauthPolicy};

use crate::error::StoreError;
use crate::keychain;
use crate::persistence::{default_config_path, load_json, save_json};

// ============================================================================
// Log Level
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    }
}

// ============================================================================
// Config Types
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Accounts to poll.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Seconds between cycles.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Re-logins allowed per cycle after a rejected session.
    #[serde(default = "default_max_reauth_attempts")]
    pub max_reauth_attempts: u32,
    /// Log level.
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_reauth_attempts() -> u32 {
    ReauthPolicy::default().max_reauth_attempts
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            request_timeout: default_request_timeout(),
            max_reauth_attempts: default_max_reauth_attempts(),
            log_level: LogLevel::default(),
        }
    }
}

impl GeneralConfig {
    /// Polling settings described by this config.
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::default()
            .with_interval(Duration::from_secs(self.refresh_interval.max(1)))
            .with_timeout(Duration::from_secs(self.request_timeout.max(1)))
            .with_reauth(ReauthPolicy::new(self.max_reauth_attempts))
    }
}

/// One configured account.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Regional site.
    pub region: Region,
    /// Login name.
    pub username: String,
    /// Password; when absent the keychain is asked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("region", &self.region)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AccountConfig {
    /// Creates an account entry.
    pub fn new(region: Region, username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            region,
            username: username.into().trim().to_string(),
            password,
        }
    }

    /// Stable id of this account.
    pub fn id(&self) -> AccountId {
        AccountId::new(self.region, &self.username)
    }

    /// Builds the account, reading the password from the keychain if the
    /// config has none.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingPassword` if no password is found and
    /// `StoreError::Account` if a field is empty.
    pub fn to_account(&self) -> Result<Account, StoreError> {
        self.to_account_with(keychain::get_password)
    }

    /// Builds the account with a custom password lookup.
    pub fn to_account_with<F>(&self, lookup: F) -> Result<Account, StoreError>
    where
        F: FnOnce(&AccountId) -> Option<String>,
    {
        let password = match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => password.to_string(),
            None => {
                let id = self.id();
                lookup(&id).ok_or(StoreError::MissingPassword(id))?
            }
        };
        Ok(Account::new(self.region, self.username.as_str(), password)?)
    }
}

// ============================================================================
// Load / Save
// ============================================================================

impl Config {
    /// Returns the default config file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads the config from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads the config from a path; a missing file yields the default config.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed, or if
    /// it lists the same account twice.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !tokio::fs::try_exists(path).await? {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config: Config = load_json(path).await?;
        config.check_unique()?;

        info!(path = %path.display(), accounts = config.accounts.len(), "Loaded configuration");
        Ok(config)
    }

    /// Saves the config to a path.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    fn check_unique(&self) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::new();
        for account in &self.accounts {
            let id = account.id();
            if !seen.insert(id.clone()) {
                return Err(StoreError::DuplicateAccount(id));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Polling settings for every account.
    pub fn poll_settings(&self) -> PollSettings {
        self.general.poll_settings()
    }

    /// Finds an account by id.
    pub fn find_account(&self, id: &AccountId) -> Option<&AccountConfig> {
        self.accounts.iter().find(|a| a.id() == *id)
    }

    /// Adds an account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateAccount` if the id is already present.
    pub fn add_account(&mut self, account: AccountConfig) -> Result<(), StoreError> {
        let id = account.id();
        if self.find_account(&id).is_some() {
            return Err(StoreError::DuplicateAccount(id));
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Removes an account by id and returns it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AccountNotFound` if no account has this id.
    pub fn remove_account(&mut self, id: &AccountId) -> Result<AccountConfig, StoreError> {
        let index = self
            .accounts
            .iter()
            .position(|a| a.id() == *id)
            .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))?;
        Ok(self.accounts.remove(index))
    }

    /// Builds every configured account, keeping per-account errors.
    pub fn resolve_accounts(&self) -> Vec<(AccountId, Result<Account, StoreError>)> {
        self.accounts
            .iter()
            .map(|a| (a.id(), a.to_account()))
            .collect()
    }
}
