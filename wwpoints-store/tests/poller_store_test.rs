// Pollers publishing into a `PointsStore`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use wwpoints_core::{Account, Metric, PointsSnapshot, Region};
use wwpoints_fetch::{AccountPoller, FetchError, PointsApi, ReauthPolicy, Session};
use wwpoints_store::{Availability, PointsStore};

/// Replays one fetch reply per cycle; logins always succeed.
struct ReplayApi {
    replies: Mutex<VecDeque<Result<Value, FetchError>>>,
}

impl ReplayApi {
    fn new(replies: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl PointsApi for ReplayApi {
    async fn login(&self, account: &Account) -> Result<Session, FetchError> {
        Ok(Session::new("token", Arc::new(account.clone())))
    }

    async fn fetch_points(&self, _session: &Session) -> Result<Value, FetchError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Unavailable("script exhausted".into())))
    }
}

fn setup(replies: Vec<Result<Value, FetchError>>) -> (AccountPoller<PointsStore>, Arc<PointsStore>) {
    let account = Arc::new(Account::new(Region::Us, "jane", "pw").unwrap());
    let store = Arc::new(PointsStore::new());
    let poller = AccountPoller::new(
        account,
        Arc::new(ReplayApi::new(replies)),
        store.clone(),
        ReauthPolicy::default(),
    );
    (poller, store)
}

#[tokio::test]
async fn test_transient_failure_keeps_published_snapshot() {
    let s1 = PointsSnapshot::new(12.0, 11.5, 3.0, 30.0);
    let (poller, store) = setup(vec![
        Ok(s1.to_payload()),
        Err(FetchError::Timeout),
    ]);
    let id = poller.id().clone();

    poller.run_cycle().await;
    let published = store.published_snapshot(&id).await.unwrap();
    assert!(published.same_values(&s1));

    poller.run_cycle().await;
    let after = store.published_snapshot(&id).await.unwrap();
    assert_eq!(after, published);
    assert_eq!(store.availability(&id).await, Availability::Stale);
}

#[tokio::test]
async fn test_parse_failure_publishes_no_snapshot() {
    let bad = json!({"pointsDetails": {"dailyPointsRemaining": 1}});
    let (poller, store) = setup(vec![Ok(bad)]);
    let id = poller.id().clone();

    poller.run_cycle().await;

    assert!(store.published_snapshot(&id).await.is_none());
    assert_eq!(store.availability(&id).await, Availability::Pending);
    let state = store.get(&id).await.unwrap();
    assert!(state.last_error.unwrap().contains("daily_points_used"));
}

#[tokio::test]
async fn test_auth_failure_marks_sensors_unavailable() {
    let s1 = PointsSnapshot::new(12.0, 11.5, 3.0, 30.0);
    let rejected = || Err(FetchError::AuthenticationFailed("expired".into()));
    let (poller, store) = setup(vec![Ok(s1.to_payload()), rejected(), rejected()]);
    let id = poller.id().clone();

    poller.run_cycle().await;
    poller.run_cycle().await;

    assert_eq!(store.availability(&id).await, Availability::NeedsReauth);
    assert_eq!(
        store.sensor_value(&id, Metric::DailyPointsRemaining).await,
        None
    );
}
