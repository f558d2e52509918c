//! Account-related types.
//!
//! This module contains types describing one set of remote-service credentials:
//! - [`Region`] - Enum of supported regional sites
//! - [`Account`] - Immutable credentials plus region
//! - [`AccountId`] - Stable key for one configured account

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

// ============================================================================
// Region
// ============================================================================

/// Supported regional sites.
///
/// Each region selects the domain that hosts both the auth and the data APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// Australia
    Au,
    /// Belgium (Dutch)
    Nb,
    /// Belgium (French)
    Fb,
    /// Brazil
    Br,
    /// Canada (English)
    Ca,
    /// Canada (French)
    Fc,
    /// France
    Fr,
    /// Germany
    De,
    /// Netherlands
    Nl,
    /// New Zealand
    Nz,
    /// Sweden
    Se,
    /// Switzerland (French)
    Fs,
    /// Switzerland (German)
    Ds,
    /// United Kingdom
    Uk,
    /// United States
    #[default]
    Us,
}

impl Region {
    /// Returns all supported regions.
    pub fn all() -> &'static [Region] {
        &[
            Self::Au,
            Self::Nb,
            Self::Fb,
            Self::Br,
            Self::Ca,
            Self::Fc,
            Self::Fr,
            Self::De,
            Self::Nl,
            Self::Nz,
            Self::Se,
            Self::Fs,
            Self::Ds,
            Self::Uk,
            Self::Us,
        ]
    }

    /// Returns the two-letter region code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Au => "AU",
            Self::Nb => "NB",
            Self::Fb => "FB",
            Self::Br => "BR",
            Self::Ca => "CA",
            Self::Fc => "FC",
            Self::Fr => "FR",
            Self::De => "DE",
            Self::Nl => "NL",
            Self::Nz => "NZ",
            Self::Se => "SE",
            Self::Fs => "FS",
            Self::Ds => "DS",
            Self::Uk => "UK",
            Self::Us => "US",
        }
    }

    /// Returns the regional domain serving this region.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Au | Self::Nz => "weightwatchers.com.au",
            Self::Nb => "weightwatchers.be",
            Self::Fb => "fr.weightwatchers.be",
            Self::Br => "vigilantesdopeso.com.br",
            Self::Ca => "weightwatchers.ca",
            Self::Fc => "fr.weightwatchers.ca",
            Self::Fr => "weightwatchers.fr",
            Self::De => "weightwatchers.de",
            Self::Nl => "weightwatchers.nl",
            Self::Se => "viktvaktarna.se",
            Self::Fs => "fr.weightwatchers.ch",
            Self::Ds => "weightwatchers.ch",
            Self::Uk => "weightwatchers.co.uk",
            Self::Us => "weightwatchers.com",
        }
    }

    /// Base URL of the authentication host.
    pub fn auth_base_url(&self) -> String {
        format!("https://auth.{}", self.domain())
    }

    /// Base URL of the member data host.
    pub fn cmx_base_url(&self) -> String {
        format!("https://cmx.{}", self.domain())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|r| r.code() == code)
            .ok_or_else(|| CoreError::UnknownRegion(s.to_string()))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Account Id
// ============================================================================

/// Stable key for one configured account: `"<REGION>:<identifier lowercased>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Builds the id for a region and identifier.
    pub fn new(region: Region, identifier: &str) -> Self {
        Self(format!("{}:{}", region.code(), identifier.trim().to_lowercase()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Account
// ============================================================================

/// One set of credentials plus the region they belong to.
///
/// Immutable once created. Reconfiguration builds a new `Account` and hands it
/// to the poller; nothing mutates an account in place.
#[derive(Debug, Clone)]
pub struct Account {
    region: Region,
    identifier: String,
    secret: SecretString,
}

impl Account {
    /// Creates a new account, trimming the identifier.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAccount` if the identifier or secret is empty.
    pub fn new(
        region: Region,
        identifier: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let identifier = identifier.into().trim().to_string();
        let secret: String = secret.into();

        if identifier.is_empty() {
            return Err(CoreError::InvalidAccount("username is empty".to_string()));
        }
        if secret.is_empty() {
            return Err(CoreError::InvalidAccount(format!(
                "password for {identifier} is empty"
            )));
        }

        Ok(Self {
            region,
            identifier,
            secret: SecretString::from(secret),
        })
    }

    /// The account's region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// The username / email used to log in.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The password.
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// The stable id of this account.
    pub fn id(&self) -> AccountId {
        AccountId::new(self.region, &self.identifier)
    }

    /// Human-readable title for this account.
    pub fn title(&self) -> String {
        format!("WeightWatchers ({})", self.identifier)
    }

    /// Returns true if both accounts carry the same region, identifier and secret.
    pub fn same_credentials(&self, other: &Account) -> bool {
        self.region == other.region
            && self.identifier == other.identifier
            && self.secret.expose_secret() == other.secret.expose_secret()
    }
}
