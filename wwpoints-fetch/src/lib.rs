// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `wwpoints` Fetch
//!
//! Talks to the remote points service and drives per-account polling.
//!
//! ## Request Layer
//!
//! - [`api::PointsApi`] - Login and fetch, the two request shapes
//! - [`api::WeightWatchersApi`] - HTTP implementation
//! - [`parser::parse_points`] - Payload to snapshot
//!
//! ## Polling
//!
//! - [`session::SessionManager`] - One account's session state machine
//! - [`poller::AccountPoller`] - One cycle at a time, bounded re-login
//! - [`supervisor::PollingSupervisor`] - Start/stop/update for the host
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wwpoints_fetch::{PollSettings, PollingSupervisor, WeightWatchersApi};
//!
//! let settings = PollSettings::default();
//! let api = Arc::new(WeightWatchersApi::from_settings(&settings)?);
//! let supervisor = PollingSupervisor::new(api, sink, settings);
//! supervisor.start(account).await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod parser;
pub mod poller;
pub mod retry;
pub mod session;
pub mod settings;
pub mod supervisor;

// Errors
pub use error::{FetchError, ParseError, SupervisorError};

// Request layer
pub use api::{Endpoints, PointsApi, WeightWatchersApi, validate_account};
pub use client::{DEFAULT_TIMEOUT_SECS, USER_AGENT, build_client};
pub use parser::parse_points;

// Polling
pub use poller::{AccountPoller, CycleOutcome};
pub use retry::ReauthPolicy;
pub use session::{Session, SessionManager, SessionState};
pub use settings::{DEFAULT_INTERVAL_SECS, PollSettings};
pub use supervisor::PollingSupervisor;
