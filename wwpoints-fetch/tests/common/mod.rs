// Shared fakes for the fetch crate's integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;
use wwpoints_core::{Account, AccountId, PollResult, PollSink, Region};
use wwpoints_fetch::{FetchError, PointsApi, Session};

// ── Fixtures ────────────────────────────────────────────────────────

pub fn account() -> Account {
    Account::new(Region::Us, "jane@example.com", "hunter2").unwrap()
}

pub fn fixture_payload() -> Value {
    json!({
        "pointsDetails": {
            "dailyPointsRemaining": 12,
            "dailyPointsUsed": 11.5,
            "dailyActivityPointsEarned": 3,
            "weeklyPointAllowanceRemaining": 30
        }
    })
}

// ── Scripted API ────────────────────────────────────────────────────

/// One scripted reply. Once a script runs dry every call succeeds.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok,
    Reject,
    Down,
    Payload(Value),
}

/// In-memory `PointsApi` that counts calls and replays a script.
#[derive(Default)]
pub struct ScriptedApi {
    logins: AtomicU32,
    fetches: AtomicU32,
    login_script: Mutex<VecDeque<Reply>>,
    fetch_script: Mutex<VecDeque<Reply>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logins(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.login_script.lock().unwrap().extend(replies);
        self
    }

    pub fn with_fetches(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.fetch_script.lock().unwrap().extend(replies);
        self
    }

    /// Every fetch waits for the gate to be notified before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn logins(&self) -> u32 {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub async fn wait_for_fetches(&self, count: u32) {
        while self.fetches() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PointsApi for ScriptedApi {
    async fn login(&self, account: &Account) -> Result<Session, FetchError> {
        let n = self.logins.fetch_add(1, Ordering::SeqCst);
        let reply = self.login_script.lock().unwrap().pop_front();
        match reply.unwrap_or(Reply::Ok) {
            Reply::Reject => Err(FetchError::AuthenticationFailed("bad password".into())),
            Reply::Down => Err(FetchError::Unavailable("login HTTP 503".into())),
            Reply::Ok | Reply::Payload(_) => {
                Ok(Session::new(format!("session-{n}"), Arc::new(account.clone())))
            }
        }
    }

    async fn fetch_points(&self, _session: &Session) -> Result<Value, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let reply = self.fetch_script.lock().unwrap().pop_front();
        match reply.unwrap_or(Reply::Ok) {
            Reply::Reject => Err(FetchError::AuthenticationFailed("session expired".into())),
            Reply::Down => Err(FetchError::Timeout),
            Reply::Payload(body) => Ok(body),
            Reply::Ok => Ok(fixture_payload()),
        }
    }
}

// ── Recording sink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    results: Mutex<Vec<(AccountId, PollResult)>>,
}

impl RecordingSink {
    pub fn results(&self) -> Vec<(AccountId, PollResult)> {
        self.results.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.results.lock().unwrap().len()
    }
}

impl PollSink for RecordingSink {
    async fn publish(&self, account: &AccountId, result: PollResult) {
        self.results.lock().unwrap().push((account.clone(), result));
    }
}

// ── Gated sink ──────────────────────────────────────────────────────

/// Sink whose `publish` blocks until the gate is notified, then records.
pub struct GatedSink {
    gate: Arc<Notify>,
    entered: AtomicU32,
    inner: RecordingSink,
}

impl GatedSink {
    pub fn new(gate: Arc<Notify>) -> Self {
        Self {
            gate,
            entered: AtomicU32::new(0),
            inner: RecordingSink::default(),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }

    /// Waits until `count` publishes have reached the gate.
    pub async fn wait_for_publishes(&self, count: u32) {
        while self.entered.load(Ordering::SeqCst) < count {
            tokio::task::yield_now().await;
        }
    }
}

impl PollSink for GatedSink {
    async fn publish(&self, account: &AccountId, result: PollResult) {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.inner.publish(account, result).await;
    }
}
