// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `wwpoints` Core
//!
//! Core types, models, and traits for `wwpoints`.
//!
//! This crate provides the foundational abstractions used across all other
//! `wwpoints` crates, including:
//!
//! - Domain models (regions, accounts, point snapshots, poll results)
//! - Error types
//! - The host boundary trait
//!
//! ## Key Types
//!
//! ### Account Types
//! - [`Region`] - Enum of supported regional sites
//! - [`Account`] - Immutable credentials plus region
//! - [`AccountId`] - Stable per-account key
//!
//! ### Points Types
//! - [`PointsSnapshot`] - The four metrics for one cycle
//! - [`Metric`] - Metric keys, names, and icons
//!
//! ### Cycle Outcome
//! - [`PollResult`] - Tagged outcome of one poll cycle
//! - [`PollSink`] - Where poll results are published

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Account types
    Account,
    AccountId,
    Region,
    // Points types
    Metric,
    POINTS_DETAILS_KEY,
    POINTS_UNIT,
    PointsSnapshot,
    // Cycle outcome
    PollResult,
    PollResultKind,
};

// Re-export traits
pub use traits::PollSink;
