//! Per-account polling coordinator.
//!
//! One [`AccountPoller`] drives one account: ensure a session, fetch, parse,
//! publish. The session manager sits behind a mutex that doubles as the
//! in-flight guard, so a cycle that finds it locked is skipped rather than
//! queued, and results for one account are published in completion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use wwpoints_core::{Account, AccountId, PollResult, PollSink};

use crate::api::PointsApi;
use crate::error::FetchError;
use crate::parser::parse_points;
use crate::retry::ReauthPolicy;
use crate::session::SessionManager;

/// Shortest period the run loop accepts.
const MIN_PERIOD: Duration = Duration::from_millis(1);

// ============================================================================
// Cycle Outcome
// ============================================================================

/// What happened to one call of [`AccountPoller::run_cycle`].
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Another cycle for this account was still in flight.
    Skipped,
    /// The poller was cancelled; the result was dropped.
    Discarded,
    /// The result was handed to the sink.
    Published(PollResult),
}

impl CycleOutcome {
    /// The published result, if any.
    pub fn result(&self) -> Option<&PollResult> {
        match self {
            Self::Published(result) => Some(result),
            _ => None,
        }
    }
}

// ============================================================================
// Account Poller
// ============================================================================

/// Polling coordinator for a single account.
pub struct AccountPoller<S: PollSink> {
    id: AccountId,
    api: Arc<dyn PointsApi>,
    session: Mutex<SessionManager>,
    sink: Arc<S>,
    reauth: ReauthPolicy,
    cancel: CancellationToken,
}

impl<S: PollSink> AccountPoller<S> {
    /// Creates a poller with a fresh, unauthenticated session manager.
    pub fn new(
        account: Arc<Account>,
        api: Arc<dyn PointsApi>,
        sink: Arc<S>,
        reauth: ReauthPolicy,
    ) -> Self {
        Self {
            id: account.id(),
            session: Mutex::new(SessionManager::new(account, Arc::clone(&api))),
            api,
            sink,
            reauth,
            cancel: CancellationToken::new(),
        }
    }

    /// The polled account's id.
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Stops the run loop; an in-flight cycle is not published, even one
    /// already waiting on the sink.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Runs one cycle and publishes its result.
    ///
    /// Returns [`CycleOutcome::Skipped`] without touching the network if a
    /// cycle for this account is already running.
    #[instrument(skip(self), fields(account = %self.id))]
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(mut session) = self.session.try_lock() else {
            debug!("Previous cycle still in flight, skipping");
            return CycleOutcome::Skipped;
        };

        if self.cancel.is_cancelled() {
            return CycleOutcome::Discarded;
        }

        let result = self.execute(&mut session).await;

        if self.cancel.is_cancelled() {
            info!(kind = %result.kind(), "Poller cancelled, discarding cycle result");
            return CycleOutcome::Discarded;
        }

        log_result(&result);
        // Published under the lock so the next cycle cannot overtake it. A
        // cancel that lands while the sink is still busy drops the publish.
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                info!(
                    kind = %result.kind(),
                    "Poller cancelled while publishing, discarding cycle result"
                );
                CycleOutcome::Discarded
            }
            () = self.sink.publish(&self.id, result.clone()) => CycleOutcome::Published(result),
        }
    }

    async fn execute(&self, session: &mut SessionManager) -> PollResult {
        let mut reauths = 0;

        loop {
            let current = match session.ensure_session().await {
                Ok(current) => current,
                Err(e) => return e.into_poll_result(),
            };

            match self.api.fetch_points(&current).await {
                Ok(payload) => {
                    return match parse_points(&payload) {
                        Ok(snapshot) => PollResult::Success(snapshot),
                        Err(e) => FetchError::from(e).into_poll_result(),
                    };
                }
                Err(e) if e.is_auth() => {
                    session.invalidate();
                    if !self.reauth.allows(reauths) {
                        return e.into_poll_result();
                    }
                    reauths += 1;
                    info!(attempt = reauths, "Session rejected, logging in again");
                }
                Err(e) => return e.into_poll_result(),
            }
        }
    }

    /// Runs a cycle now and then every `period` until cancelled.
    ///
    /// Ticks missed while a cycle was running are skipped.
    pub async fn run(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(account = %self.id, period_secs = period.as_secs(), "Poller started");
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
        debug!(account = %self.id, "Poller stopped");
    }
}

fn log_result(result: &PollResult) {
    match result {
        PollResult::Success(snapshot) => info!(
            remaining = snapshot.daily_points_remaining,
            used = snapshot.daily_points_used,
            "Points updated"
        ),
        PollResult::AuthFailure(reason) => warn!(%reason, "Authentication failed"),
        PollResult::TransientFailure(reason) => warn!(%reason, "Points temporarily unavailable"),
        PollResult::ParseFailure(reason) => error!(%reason, "Unexpected points response"),
    }
}
