//! Session lifecycle for one account.
//!
//! [`SessionManager`] owns the authentication state machine:
//!
//! ```text
//! Unauthenticated --ensure_session, login ok--> Authenticated
//! Unauthenticated --ensure_session, login rejected--> (error) Unauthenticated
//! Authenticated --invalidate / expiry / reset--> Unauthenticated
//! ```
//!
//! A rejected login is reported to the caller and leaves the manager
//! unauthenticated, so the next cycle tries again with whatever credentials
//! the account holds then.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use tracing::{debug, info, warn};
use wwpoints_core::Account;

use crate::api::PointsApi;
use crate::error::FetchError;

/// A session this close to its expiry hint is treated as already expired.
///
/// Capped at half the session's lifetime so short-lived tokens are usable
/// when issued.
pub const EXPIRY_SKEW_SECS: i64 = 60;

// ============================================================================
// Session
// ============================================================================

/// An authenticated context for one account.
///
/// The token is opaque here: it is handed back to the API client unchanged.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    issued_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    account: Arc<Account>,
}

impl Session {
    /// Creates a session issued now.
    pub fn new(token: impl Into<String>, account: Arc<Account>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            issued_at: Utc::now(),
            expires_at: None,
            account,
        }
    }

    /// Attaches an expiry hint.
    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// The opaque session token.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// When the session was created.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry hint, if the service provided one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// The account this session belongs to.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Returns true if the expiry hint says this session is no longer usable.
    ///
    /// Sessions without a hint are usable until the service rejects them.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| {
            let half_life = (exp - self.issued_at) / 2;
            let skew = Duration::seconds(EXPIRY_SKEW_SECS)
                .min(half_life)
                .max(Duration::zero());
            now >= exp - skew
        })
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Authentication state of one account.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No usable session.
    #[default]
    Unauthenticated,
    /// A session the service has not rejected yet.
    Authenticated(Session),
}

// ============================================================================
// Session Manager
// ============================================================================

/// Owns the session of exactly one account.
pub struct SessionManager {
    account: Arc<Account>,
    api: Arc<dyn PointsApi>,
    state: SessionState,
}

impl SessionManager {
    /// Creates an unauthenticated manager.
    pub fn new(account: Arc<Account>, api: Arc<dyn PointsApi>) -> Self {
        Self {
            account,
            api,
            state: SessionState::Unauthenticated,
        }
    }

    /// The account this manager logs in as.
    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns true if a session is held.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Returns a usable session, logging in if there is none.
    ///
    /// Never returns a session known to be stale. A rejected login is
    /// returned as `FetchError::AuthenticationFailed`; transport problems
    /// during login keep their own classification.
    pub async fn ensure_session(&mut self) -> Result<Session, FetchError> {
        if let SessionState::Authenticated(session) = &self.state {
            if !session.is_stale_at(Utc::now()) {
                return Ok(session.clone());
            }
            debug!(account = %self.account.id(), "Session past its expiry, logging in again");
            self.state = SessionState::Unauthenticated;
        }

        match self.api.login(&self.account).await {
            Ok(mut session) => {
                if session.is_stale_at(Utc::now()) {
                    warn!(
                        account = %self.account.id(),
                        expires_at = ?session.expires_at(),
                        "Fresh session already past its expiry hint, ignoring the hint"
                    );
                    session = session.with_expiry(None);
                }
                info!(account = %self.account.id(), "Logged in");
                self.state = SessionState::Authenticated(session.clone());
                Ok(session)
            }
            Err(e) => {
                warn!(account = %self.account.id(), error = %e, "Login failed");
                self.state = SessionState::Unauthenticated;
                Err(e)
            }
        }
    }

    /// Drops the current session. Safe to call repeatedly.
    pub fn invalidate(&mut self) {
        if self.is_authenticated() {
            debug!(account = %self.account.id(), "Session invalidated");
        }
        self.state = SessionState::Unauthenticated;
    }

    /// Swaps in a replacement account and discards the old session.
    pub fn reset(&mut self, account: Arc<Account>) {
        debug!(account = %account.id(), "Session manager reset");
        self.account = account;
        self.state = SessionState::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wwpoints_core::Region;

    struct CountingApi {
        logins: AtomicU32,
        reject: bool,
        expiry: Option<DateTime<Utc>>,
    }

    impl CountingApi {
        fn new(reject: bool, expiry: Option<DateTime<Utc>>) -> Self {
            Self {
                logins: AtomicU32::new(0),
                reject,
                expiry,
            }
        }
    }

    #[async_trait]
    impl PointsApi for CountingApi {
        async fn login(&self, account: &Account) -> Result<Session, FetchError> {
            let n = self.logins.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(FetchError::AuthenticationFailed("rejected".into()));
            }
            Ok(Session::new(format!("token-{n}"), Arc::new(account.clone()))
                .with_expiry(self.expiry))
        }

        async fn fetch_points(&self, _session: &Session) -> Result<Value, FetchError> {
            Ok(Value::Null)
        }
    }

    fn account() -> Arc<Account> {
        Arc::new(Account::new(Region::Us, "jane", "pw").unwrap())
    }

    #[tokio::test]
    async fn test_session_reused_until_invalidated() {
        let api = Arc::new(CountingApi::new(false, None));
        let mut manager = SessionManager::new(account(), api.clone());

        manager.ensure_session().await.unwrap();
        manager.ensure_session().await.unwrap();
        assert_eq!(api.logins.load(Ordering::SeqCst), 1);

        manager.invalidate();
        manager.invalidate();
        assert!(!manager.is_authenticated());

        manager.ensure_session().await.unwrap();
        assert_eq!(api.logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_login_resets_to_unauthenticated() {
        let api = Arc::new(CountingApi::new(true, None));
        let mut manager = SessionManager::new(account(), api.clone());

        let err = manager.ensure_session().await.unwrap_err();
        assert!(err.is_auth());
        assert!(matches!(manager.state(), SessionState::Unauthenticated));

        // Next call retries rather than staying failed.
        let _ = manager.ensure_session().await;
        assert_eq!(api.logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_returned_session_never_stale() {
        for expiry in [
            Utc::now() - Duration::minutes(5),
            Utc::now() + Duration::seconds(30),
            Utc::now() + Duration::seconds(90),
            Utc::now() + Duration::hours(1),
        ] {
            let api = Arc::new(CountingApi::new(false, Some(expiry)));
            let mut manager = SessionManager::new(account(), api.clone());

            for _ in 0..3 {
                let session = manager.ensure_session().await.unwrap();
                assert!(!session.is_stale_at(Utc::now()), "stale session for {expiry}");
            }
            assert_eq!(api.logins.load(Ordering::SeqCst), 1, "relogged for {expiry}");
        }
    }

    #[tokio::test]
    async fn test_session_past_expiry_relogs() {
        let api = Arc::new(CountingApi::new(false, None));
        let mut manager = SessionManager::new(account(), api.clone());
        manager.ensure_session().await.unwrap();

        // Simulate the hint running out while the session is held.
        if let SessionState::Authenticated(session) = &mut manager.state {
            *session = session
                .clone()
                .with_expiry(Some(Utc::now() - Duration::minutes(1)));
        }

        manager.ensure_session().await.unwrap();
        assert_eq!(api.logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_discards_session() {
        let api = Arc::new(CountingApi::new(false, None));
        let mut manager = SessionManager::new(account(), api);
        manager.ensure_session().await.unwrap();

        let replacement = Arc::new(Account::new(Region::Uk, "jane", "new-pw").unwrap());
        manager.reset(replacement);
        assert!(!manager.is_authenticated());
        assert_eq!(manager.account().region(), Region::Uk);
    }

    #[test]
    fn test_skew_applies() {
        let fresh = Session::new("t", account())
            .with_expiry(Some(Utc::now() + Duration::hours(1)));
        let exp = fresh.expires_at().unwrap();
        assert!(!fresh.is_stale_at(Utc::now()));
        assert!(!fresh.is_stale_at(exp - Duration::seconds(61)));
        assert!(fresh.is_stale_at(exp - Duration::seconds(59)));
    }

    #[test]
    fn test_skew_capped_at_half_lifetime() {
        let short = Session::new("t", account())
            .with_expiry(Some(Utc::now() + Duration::seconds(30)));
        let issued = short.issued_at();
        assert!(!short.is_stale_at(issued));
        assert!(!short.is_stale_at(issued + Duration::seconds(14)));
        assert!(short.is_stale_at(issued + Duration::seconds(16)));
    }
}
