//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use wwpoints_core::{AccountId, PointsSnapshot, PollResult, Region};
use wwpoints_store::AccountState;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOutput {
    pub account: String,
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<PointsOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The four metrics, plus the service's own fields under `details`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsOutput {
    pub daily_points_remaining: f64,
    pub daily_points_used: f64,
    pub daily_activity_points_earned: f64,
    pub weekly_points_remaining: f64,
    #[serde(serialize_with = "serialize_datetime")]
    pub retrieved_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl From<&PointsSnapshot> for PointsOutput {
    fn from(snapshot: &PointsSnapshot) -> Self {
        Self {
            daily_points_remaining: snapshot.daily_points_remaining,
            daily_points_used: snapshot.daily_points_used,
            daily_activity_points_earned: snapshot.daily_activity_points_earned,
            weekly_points_remaining: snapshot.weekly_points_remaining,
            retrieved_at: snapshot.retrieved_at,
            details: snapshot.details.clone(),
        }
    }
}

/// One region.
#[derive(Debug, Serialize)]
pub struct RegionOutput {
    pub code: &'static str,
    pub domain: &'static str,
}

/// Result of a credential check.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub account: String,
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable data.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let output = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(output)
    }

    /// Converts a one-shot cycle result.
    pub fn cycle_output(&self, id: &AccountId, result: &PollResult) -> AccountOutput {
        AccountOutput {
            account: id.to_string(),
            title: title(id),
            status: kind_code(result),
            availability: None,
            points: result.snapshot().map(PointsOutput::from),
            error: result.reason().map(str::to_string),
        }
    }

    /// Converts an account whose config could not be turned into credentials.
    pub fn config_error_output(&self, id: &AccountId, error: &str) -> AccountOutput {
        AccountOutput {
            account: id.to_string(),
            title: title(id),
            status: "config_error".to_string(),
            availability: None,
            points: None,
            error: Some(error.to_string()),
        }
    }

    /// Converts published state from the watch loop.
    pub fn state_output(&self, id: &AccountId, state: &AccountState) -> AccountOutput {
        AccountOutput {
            account: id.to_string(),
            title: title(id),
            status: state
                .last_kind
                .map_or_else(|| "pending".to_string(), |k| serde_code(&k)),
            availability: Some(serde_code(&state.availability)),
            points: state.published_snapshot().map(PointsOutput::from),
            error: state.last_error.clone(),
        }
    }

    /// Formats the region list.
    pub fn format_regions(&self) -> Result<String> {
        let regions: Vec<_> = Region::all()
            .iter()
            .map(|r| RegionOutput {
                code: r.code(),
                domain: r.domain(),
            })
            .collect();
        self.format(&regions)
    }
}

fn title(id: &AccountId) -> String {
    format!("WeightWatchers ({id})")
}

fn kind_code(result: &PollResult) -> String {
    serde_code(&result.kind())
}

/// The snake_case name serde gives a unit variant.
fn serde_code<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
