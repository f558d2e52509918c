//! Poll outcome types.
//!
//! - [`PollResult`] - What one cycle produced
//! - [`PollResultKind`] - The tag of a result, without payload

use std::fmt;

use serde::{Deserialize, Serialize};

use super::snapshot::PointsSnapshot;

/// Outcome of one poll cycle for one account.
///
/// Produced once per cycle and consumed once by the publish step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PollResult {
    /// All four metrics were fetched and parsed.
    Success(PointsSnapshot),
    /// Credentials rejected, or the session was rejected after the bounded re-login.
    AuthFailure(String),
    /// Network error, timeout, or server error. Retried on the next interval.
    TransientFailure(String),
    /// The response did not have the expected shape.
    ParseFailure(String),
}

impl PollResult {
    /// Returns the tag of this result.
    pub fn kind(&self) -> PollResultKind {
        match self {
            Self::Success(_) => PollResultKind::Success,
            Self::AuthFailure(_) => PollResultKind::AuthFailure,
            Self::TransientFailure(_) => PollResultKind::TransientFailure,
            Self::ParseFailure(_) => PollResultKind::ParseFailure,
        }
    }

    /// Returns true for [`PollResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the snapshot of a successful result.
    pub fn snapshot(&self) -> Option<&PointsSnapshot> {
        match self {
            Self::Success(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Returns the failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::AuthFailure(r) | Self::TransientFailure(r) | Self::ParseFailure(r) => Some(r),
        }
    }
}

/// The tag of a [`PollResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollResultKind {
    /// Snapshot produced.
    Success,
    /// Authentication failure.
    AuthFailure,
    /// Transient failure.
    TransientFailure,
    /// Parse failure.
    ParseFailure,
}

impl PollResultKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::AuthFailure => "Authentication failure",
            Self::TransientFailure => "Transient failure",
            Self::ParseFailure => "Parse failure",
        }
    }
}

impl fmt::Display for PollResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
