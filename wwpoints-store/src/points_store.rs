//! Published points state.
//!
//! [`PointsStore`] is the entity layer: pollers publish [`PollResult`]s into
//! it, and readers see per-account sensor values, availability, and the last
//! error. Subscribers are told about every change through a watch channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};
use wwpoints_core::{AccountId, Metric, PointsSnapshot, PollResult, PollResultKind, PollSink};

// ============================================================================
// Availability
// ============================================================================

/// What a reader should make of an account's sensor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// No cycle has produced values yet.
    #[default]
    Pending,
    /// Values come from the latest cycle.
    Available,
    /// Values are from an earlier cycle; the latest one could not reach the service.
    Stale,
    /// Credentials or session were rejected; values are hidden until a cycle succeeds.
    NeedsReauth,
}

impl Availability {
    /// Returns true if sensor values should be shown.
    pub fn shows_values(&self) -> bool {
        matches!(self, Self::Available | Self::Stale)
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Available => "available",
            Self::Stale => "stale",
            Self::NeedsReauth => "needs reauthentication",
        })
    }
}

// ============================================================================
// Account State
// ============================================================================

/// Published state of one account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountState {
    /// Last successfully fetched snapshot.
    pub snapshot: Option<PointsSnapshot>,
    /// Current availability.
    pub availability: Availability,
    /// Reason of the last failed cycle, cleared on success.
    pub last_error: Option<String>,
    /// Kind of the last cycle result.
    pub last_kind: Option<PollResultKind>,
    /// When the last result arrived.
    pub updated_at: Option<DateTime<Utc>>,
}

impl AccountState {
    /// Folds one cycle result into this state.
    pub fn apply(&mut self, result: PollResult) {
        self.last_kind = Some(result.kind());
        self.updated_at = Some(Utc::now());

        match result {
            PollResult::Success(snapshot) => {
                self.snapshot = Some(snapshot);
                self.availability = Availability::Available;
                self.last_error = None;
            }
            PollResult::AuthFailure(reason) => {
                self.availability = Availability::NeedsReauth;
                self.last_error = Some(reason);
            }
            PollResult::TransientFailure(reason) => {
                if self.availability == Availability::Available {
                    self.availability = Availability::Stale;
                }
                self.last_error = Some(reason);
            }
            PollResult::ParseFailure(reason) => {
                self.last_error = Some(reason);
            }
        }
    }

    /// The snapshot readers should see, if any.
    pub fn published_snapshot(&self) -> Option<&PointsSnapshot> {
        self.snapshot
            .as_ref()
            .filter(|_| self.availability.shows_values())
    }

    /// One sensor's value; `None` while unavailable.
    pub fn sensor_value(&self, metric: Metric) -> Option<f64> {
        self.published_snapshot().map(|s| s.value(metric))
    }
}

// ============================================================================
// Points Store
// ============================================================================

/// Per-account published state with change notifications.
pub struct PointsStore {
    accounts: Arc<RwLock<HashMap<AccountId, AccountState>>>,
    notify: watch::Sender<u64>,
}

impl Default for PointsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PointsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            notify,
        }
    }

    /// Applies a result and notifies subscribers.
    pub async fn apply(&self, account: &AccountId, result: PollResult) {
        let kind = result.kind();
        {
            let mut accounts = self.accounts.write().await;
            accounts.entry(account.clone()).or_default().apply(result);
        }
        self.notify_change();
        debug!(account = %account, kind = %kind, "Published state updated");
    }

    /// State of one account.
    pub async fn get(&self, account: &AccountId) -> Option<AccountState> {
        self.accounts.read().await.get(account).cloned()
    }

    /// States of all accounts, sorted by id.
    pub async fn all(&self) -> Vec<(AccountId, AccountState)> {
        let mut all: Vec<_> = self
            .accounts
            .read()
            .await
            .iter()
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Availability of an account; unknown accounts are pending.
    pub async fn availability(&self, account: &AccountId) -> Availability {
        self.accounts
            .read()
            .await
            .get(account)
            .map(|s| s.availability)
            .unwrap_or_default()
    }

    /// The snapshot readers should see for an account.
    pub async fn published_snapshot(&self, account: &AccountId) -> Option<PointsSnapshot> {
        self.accounts
            .read()
            .await
            .get(account)
            .and_then(|s| s.published_snapshot().cloned())
    }

    /// One sensor's value; `None` while unavailable.
    pub async fn sensor_value(&self, account: &AccountId, metric: Metric) -> Option<f64> {
        self.accounts
            .read()
            .await
            .get(account)
            .and_then(|s| s.sensor_value(metric))
    }

    /// Drops an account's state. Returns false if it was unknown.
    pub async fn remove(&self, account: &AccountId) -> bool {
        let removed = self.accounts.write().await.remove(account).is_some();
        if removed {
            info!(account = %account, "Removed account state");
            self.notify_change();
        }
        removed
    }

    /// Subscribes to changes. The value is a counter bumped on each change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version += 1);
    }
}

impl PollSink for PointsStore {
    async fn publish(&self, account: &AccountId, result: PollResult) {
        self.apply(account, result).await;
    }
}
