//! Host lifecycle for pollers.
//!
//! The supervisor owns one background task per running account. It is the
//! host-facing surface: `start`, `stop`, `update`, plus `refresh` for an
//! on-demand cycle.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use wwpoints_core::{Account, AccountId, PollSink};

use crate::api::PointsApi;
use crate::error::SupervisorError;
use crate::poller::{AccountPoller, CycleOutcome};
use crate::settings::PollSettings;

struct PollerHandle<S: PollSink> {
    poller: Arc<AccountPoller<S>>,
    task: JoinHandle<()>,
}

impl<S: PollSink> PollerHandle<S> {
    fn stop(self) {
        self.poller.cancel();
        self.task.abort();
    }
}

/// Runs one [`AccountPoller`] per started account.
pub struct PollingSupervisor<S: PollSink> {
    api: Arc<dyn PointsApi>,
    sink: Arc<S>,
    settings: PollSettings,
    pollers: Mutex<HashMap<AccountId, PollerHandle<S>>>,
}

impl<S: PollSink> PollingSupervisor<S> {
    /// Creates a supervisor with no running accounts.
    pub fn new(api: Arc<dyn PointsApi>, sink: Arc<S>, settings: PollSettings) -> Self {
        Self {
            api,
            sink,
            settings,
            pollers: Mutex::new(HashMap::new()),
        }
    }

    /// The sink results are published to.
    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Polling settings applied to every account.
    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    fn spawn(&self, account: Account) -> PollerHandle<S> {
        let poller = Arc::new(AccountPoller::new(
            Arc::new(account),
            Arc::clone(&self.api),
            Arc::clone(&self.sink),
            self.settings.reauth,
        ));
        let task = tokio::spawn(Arc::clone(&poller).run(self.settings.interval));
        PollerHandle { poller, task }
    }

    /// Starts polling an account. The first cycle runs immediately.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::AlreadyRunning` if the account is polling.
    pub async fn start(&self, account: Account) -> Result<(), SupervisorError> {
        let id = account.id();
        let mut pollers = self.pollers.lock().await;
        if pollers.contains_key(&id) {
            return Err(SupervisorError::AlreadyRunning(id));
        }

        info!(account = %id, "Starting poller");
        pollers.insert(id, self.spawn(account));
        Ok(())
    }

    /// Stops polling an account. An in-flight cycle is not published.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::NotRunning` for an unknown account.
    pub async fn stop(&self, id: &AccountId) -> Result<(), SupervisorError> {
        let handle = self
            .pollers
            .lock()
            .await
            .remove(id)
            .ok_or_else(|| SupervisorError::NotRunning(id.clone()))?;

        info!(account = %id, "Stopping poller");
        handle.stop();
        Ok(())
    }

    /// Replaces a running account's credentials.
    ///
    /// The old poller is cancelled and a new one starts with no session.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::NotRunning` if no account with the same id
    /// is polling.
    pub async fn update(&self, account: Account) -> Result<(), SupervisorError> {
        let id = account.id();
        let mut pollers = self.pollers.lock().await;
        let old = pollers
            .remove(&id)
            .ok_or_else(|| SupervisorError::NotRunning(id.clone()))?;

        info!(account = %id, "Reconfiguring poller");
        old.stop();
        pollers.insert(id, self.spawn(account));
        Ok(())
    }

    /// Runs one cycle for an account now.
    ///
    /// # Errors
    ///
    /// Returns `SupervisorError::NotRunning` for an unknown account.
    pub async fn refresh(&self, id: &AccountId) -> Result<CycleOutcome, SupervisorError> {
        let poller = self
            .pollers
            .lock()
            .await
            .get(id)
            .map(|handle| Arc::clone(&handle.poller))
            .ok_or_else(|| SupervisorError::NotRunning(id.clone()))?;

        debug!(account = %id, "Manual refresh");
        Ok(poller.run_cycle().await)
    }

    /// Returns true if the account is polling.
    pub async fn is_running(&self, id: &AccountId) -> bool {
        self.pollers.lock().await.contains_key(id)
    }

    /// Ids of all polling accounts, sorted.
    pub async fn running(&self) -> Vec<AccountId> {
        let mut ids: Vec<_> = self.pollers.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Stops every poller.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.pollers.lock().await.drain().collect();
        info!(count = handles.len(), "Shutting down pollers");
        for (_, handle) in handles {
            handle.stop();
        }
    }
}

impl<S: PollSink> Drop for PollingSupervisor<S> {
    fn drop(&mut self) {
        for (_, handle) in self.pollers.get_mut().drain() {
            handle.stop();
        }
    }
}
