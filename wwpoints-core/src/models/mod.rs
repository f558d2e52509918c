//! Domain models for wwpoints.
//!
//! ## Submodules
//!
//! - [`account`] - Account types (Region, Account, AccountId)
//! - [`snapshot`] - Points types (PointsSnapshot, Metric)
//! - [`poll`] - Cycle outcome types (PollResult, PollResultKind)

mod account;
mod poll;
mod snapshot;

pub use account::{Account, AccountId, Region};
pub use poll::{PollResult, PollResultKind};
pub use snapshot::{Metric, POINTS_DETAILS_KEY, POINTS_UNIT, PointsSnapshot};
