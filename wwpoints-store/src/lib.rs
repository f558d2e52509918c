// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `wwpoints` Store
//!
//! State and configuration for `wwpoints`.
//!
//! This crate provides:
//!
//! - **PointsStore**: Published per-account points with watch channels
//! - **Config**: Accounts and polling settings with persistence
//! - **Keychain**: Password storage outside the config file
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use wwpoints_store::{Config, PointsStore};
//!
//! let config = Config::load().await?;
//! let store = Arc::new(PointsStore::new());
//!
//! // Pollers publish into the store; readers subscribe to changes.
//! let mut rx = store.subscribe();
//! while rx.changed().await.is_ok() {
//!     for (id, state) in store.all().await {
//!         println!("{id}: {}", state.availability);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod keychain;
pub mod persistence;
pub mod points_store;

pub use config::{AccountConfig, Config, GeneralConfig, LogLevel};
pub use error::StoreError;
pub use persistence::{default_config_dir, default_config_path, ensure_dir, load_json, save_json};
pub use points_store::{AccountState, Availability, PointsStore};
