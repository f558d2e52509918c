//! Fetch error types.

use thiserror::Error;
use wwpoints_core::{AccountId, PollResult};

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Classified outcome of a failed request to the remote service.
///
/// Every failure the API client sees lands in exactly one of these variants;
/// [`FetchError::into_poll_result`] maps them onto the cycle outcome tags.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Credentials or session rejected.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Network error, server error, or unexpected status.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Body could not be read as the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Payload was readable but lacked required data.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl FetchError {
    /// Returns true if the remote service rejected credentials or session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Returns true if waiting for the next interval may fix this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Unavailable(_))
    }

    /// Short code shown when a credential check fails.
    pub fn setup_code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "invalid_auth",
            Self::Timeout | Self::Unavailable(_) => "cannot_connect",
            Self::InvalidResponse(_) | Self::Parse(_) => "unknown",
        }
    }

    /// Maps this error onto the cycle outcome it represents.
    pub fn into_poll_result(self) -> PollResult {
        let reason = self.to_string();
        match self {
            Self::AuthenticationFailed(_) => PollResult::AuthFailure(reason),
            Self::Timeout | Self::Unavailable(_) => PollResult::TransientFailure(reason),
            Self::InvalidResponse(_) | Self::Parse(_) => PollResult::ParseFailure(reason),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Unavailable(err.to_string())
        }
    }
}

// ============================================================================
// Parse Error
// ============================================================================

/// Error raised when a payload cannot be turned into a snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The `pointsDetails` object is absent or not an object.
    #[error("response is missing the {0} object")]
    MissingSection(&'static str),

    /// A required metric is absent or null.
    #[error("missing field {0}")]
    MissingField(&'static str),

    /// A metric is present but not a number.
    #[error("field {field} is not numeric: {value}")]
    NotNumeric {
        /// Metric key.
        field: &'static str,
        /// The offending JSON value.
        value: String,
    },

    /// A metric is NaN or infinite.
    #[error("field {0} is not a finite number")]
    NonFinite(&'static str),
}

impl ParseError {
    /// The metric key this error is about, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingSection(_) => None,
            Self::MissingField(field) | Self::NonFinite(field) => Some(field),
            Self::NotNumeric { field, .. } => Some(field),
        }
    }
}

// ============================================================================
// Supervisor Error
// ============================================================================

/// Errors from the polling supervisor's lifecycle calls.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// `start` was called for an account that is already polling.
    #[error("Account already polling: {0}")]
    AlreadyRunning(AccountId),

    /// `stop`/`update`/`refresh` was called for an unknown account.
    #[error("Account not polling: {0}")]
    NotRunning(AccountId),
}
