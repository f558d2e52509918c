//! Points-related types.
//!
//! This module contains the values published per poll cycle:
//! - [`PointsSnapshot`] - The four point metrics at one point in time
//! - [`Metric`] - Descriptions of each published metric

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Unit shown next to every metric.
pub const POINTS_UNIT: &str = "pt";

/// Name of the payload object holding the metrics.
pub const POINTS_DETAILS_KEY: &str = "pointsDetails";

// ============================================================================
// Metric
// ============================================================================

/// One of the four published point metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Points left for today.
    DailyPointsRemaining,
    /// Points used today.
    DailyPointsUsed,
    /// Activity points earned today.
    DailyActivityPointsEarned,
    /// Weekly allowance left.
    WeeklyPointsRemaining,
}

impl Metric {
    /// Returns all metrics in publication order.
    pub fn all() -> &'static [Metric] {
        &[
            Self::DailyPointsRemaining,
            Self::DailyPointsUsed,
            Self::DailyActivityPointsEarned,
            Self::WeeklyPointsRemaining,
        ]
    }

    /// Stable metric key, also used in parse errors.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DailyPointsRemaining => "daily_points_remaining",
            Self::DailyPointsUsed => "daily_points_used",
            Self::DailyActivityPointsEarned => "daily_activity_points_earned",
            Self::WeeklyPointsRemaining => "weekly_points_remaining",
        }
    }

    /// Field name used by the remote service inside `pointsDetails`.
    pub fn wire_key(&self) -> &'static str {
        match self {
            Self::DailyPointsRemaining => "dailyPointsRemaining",
            Self::DailyPointsUsed => "dailyPointsUsed",
            Self::DailyActivityPointsEarned => "dailyActivityPointsEarned",
            Self::WeeklyPointsRemaining => "weeklyPointAllowanceRemaining",
        }
    }

    /// Returns the display name for this metric.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DailyPointsRemaining => "Daily points remaining",
            Self::DailyPointsUsed => "Daily points used",
            Self::DailyActivityPointsEarned => "Daily activity points earned",
            Self::WeeklyPointsRemaining => "Weekly points remaining",
        }
    }

    /// Material Design icon name.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::DailyPointsRemaining => "mdi:counter",
            Self::DailyPointsUsed => "mdi:food-apple",
            Self::DailyActivityPointsEarned => "mdi:run",
            Self::WeeklyPointsRemaining => "mdi:calendar-week",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Points Snapshot
// ============================================================================

/// The four point metrics for one account at one point in time.
///
/// A snapshot only exists when all four values were present and finite;
/// partial data never produces one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsSnapshot {
    /// Points left for today.
    pub daily_points_remaining: f64,
    /// Points used today.
    pub daily_points_used: f64,
    /// Activity points earned today.
    pub daily_activity_points_earned: f64,
    /// Weekly allowance left.
    pub weekly_points_remaining: f64,
    /// When the values were retrieved.
    pub retrieved_at: DateTime<Utc>,
    /// The `pointsDetails` object as the service sent it, extra fields included.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl PointsSnapshot {
    /// Creates a snapshot stamped with the current time.
    pub fn new(
        daily_points_remaining: f64,
        daily_points_used: f64,
        daily_activity_points_earned: f64,
        weekly_points_remaining: f64,
    ) -> Self {
        Self {
            daily_points_remaining,
            daily_points_used,
            daily_activity_points_earned,
            weekly_points_remaining,
            retrieved_at: Utc::now(),
            details: Map::new(),
        }
    }

    /// Attaches the raw `pointsDetails` object the values were read from.
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    /// Returns the value of one metric.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::DailyPointsRemaining => self.daily_points_remaining,
            Metric::DailyPointsUsed => self.daily_points_used,
            Metric::DailyActivityPointsEarned => self.daily_activity_points_earned,
            Metric::WeeklyPointsRemaining => self.weekly_points_remaining,
        }
    }

    /// Returns every metric paired with its value, in publication order.
    pub fn readings(&self) -> Vec<(Metric, f64)> {
        Metric::all().iter().map(|m| (*m, self.value(*m))).collect()
    }

    /// Returns true if this snapshot is older than the threshold.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        Utc::now() - self.retrieved_at > threshold
    }

    /// Returns true if the four values match, ignoring retrieval time.
    pub fn same_values(&self, other: &PointsSnapshot) -> bool {
        Metric::all()
            .iter()
            .all(|m| self.value(*m) == other.value(*m))
    }

    /// Renders the snapshot in the remote service's payload shape.
    pub fn to_payload(&self) -> Value {
        let mut details = serde_json::Map::new();
        for (metric, value) in self.readings() {
            details.insert(metric.wire_key().to_string(), json!(value));
        }
        json!({ POINTS_DETAILS_KEY: Value::Object(details) })
    }
}
