//! CLI command implementations.

pub mod check;
pub mod config;
pub mod points;
pub mod regions;
pub mod watch;

use anyhow::Result;
use std::sync::Arc;
use wwpoints_fetch::{PointsApi, PollSettings, WeightWatchersApi};

/// Builds the live API client with the configured request timeout.
pub(crate) fn live_api(settings: &PollSettings) -> Result<Arc<dyn PointsApi>> {
    Ok(Arc::new(WeightWatchersApi::from_settings(settings)?))
}
