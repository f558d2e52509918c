//! Points payload parser.
//!
//! Turns the raw day summary JSON into a [`PointsSnapshot`]. A snapshot is
//! produced only when all four metrics are present and finite; otherwise the
//! error names the first offending metric.

use serde_json::{Map, Value};
use tracing::debug;
use wwpoints_core::{Metric, POINTS_DETAILS_KEY, PointsSnapshot};

use crate::error::ParseError;

/// Parses a day summary payload.
///
/// Metrics are read from the `pointsDetails` object under their service
/// names; the snake_case metric keys are accepted as aliases. Numbers and
/// numeric strings are accepted.
pub fn parse_points(payload: &Value) -> Result<PointsSnapshot, ParseError> {
    let details = payload
        .get(POINTS_DETAILS_KEY)
        .and_then(Value::as_object)
        .ok_or(ParseError::MissingSection(POINTS_DETAILS_KEY))?;

    let snapshot = PointsSnapshot::new(
        read_metric(details, Metric::DailyPointsRemaining)?,
        read_metric(details, Metric::DailyPointsUsed)?,
        read_metric(details, Metric::DailyActivityPointsEarned)?,
        read_metric(details, Metric::WeeklyPointsRemaining)?,
    )
    .with_details(details.clone());

    debug!(
        remaining = snapshot.daily_points_remaining,
        weekly = snapshot.weekly_points_remaining,
        "Parsed points"
    );
    Ok(snapshot)
}

fn read_metric(details: &Map<String, Value>, metric: Metric) -> Result<f64, ParseError> {
    let value = details
        .get(metric.wire_key())
        .filter(|v| !v.is_null())
        .or_else(|| details.get(metric.key()).filter(|v| !v.is_null()))
        .ok_or(ParseError::MissingField(metric.key()))?;

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ParseError::NotNumeric {
        field: metric.key(),
        value: value.to_string(),
    })?;

    if !number.is_finite() {
        return Err(ParseError::NonFinite(metric.key()));
    }
    Ok(number)
}
