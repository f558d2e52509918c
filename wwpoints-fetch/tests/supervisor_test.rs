// Lifecycle of `PollingSupervisor` on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::sleep;
use wwpoints_core::{Account, Region};
use wwpoints_fetch::{CycleOutcome, PollSettings, PollingSupervisor, SupervisorError};

use common::{GatedSink, RecordingSink, ScriptedApi, account};

const INTERVAL: Duration = Duration::from_secs(900);

fn supervisor(api: &Arc<ScriptedApi>) -> PollingSupervisor<RecordingSink> {
    PollingSupervisor::new(
        api.clone(),
        Arc::new(RecordingSink::default()),
        PollSettings::default().with_interval(INTERVAL),
    )
}

#[tokio::test(start_paused = true)]
async fn test_first_cycle_immediate_then_interval() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);

    supervisor.start(account()).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(supervisor.sink().count(), 1);

    sleep(INTERVAL).await;
    assert_eq!(supervisor.sink().count(), 2);
    assert_eq!(api.logins(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_rejected() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);

    supervisor.start(account()).await.unwrap();
    let err = supervisor.start(account()).await.unwrap_err();
    assert!(matches!(err, SupervisorError::AlreadyRunning(_)));
    assert_eq!(supervisor.running().await, vec![account().id()]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_ends_polling() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);
    let id = account().id();

    supervisor.start(account()).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    supervisor.stop(&id).await.unwrap();

    sleep(INTERVAL * 3).await;
    assert_eq!(supervisor.sink().count(), 1);
    assert!(!supervisor.is_running(&id).await);
    assert!(matches!(
        supervisor.stop(&id).await.unwrap_err(),
        SupervisorError::NotRunning(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_stop_discards_in_flight_cycle() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(ScriptedApi::new().gated(gate.clone()));
    let supervisor = supervisor(&api);

    supervisor.start(account()).await.unwrap();
    api.wait_for_fetches(1).await;

    supervisor.stop(&account().id()).await.unwrap();
    gate.notify_one();
    sleep(Duration::from_secs(1)).await;

    assert_eq!(supervisor.sink().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_update_resets_session() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);

    supervisor.start(account()).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(api.logins(), 1);

    let replacement = Account::new(Region::Us, "jane@example.com", "new-password").unwrap();
    supervisor.update(replacement).await.unwrap();
    sleep(Duration::from_secs(1)).await;

    assert_eq!(api.logins(), 2);
    assert_eq!(supervisor.sink().count(), 2);
    assert_eq!(supervisor.running().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_update_discards_in_flight_cycle() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(ScriptedApi::new().gated(gate.clone()));
    let supervisor = supervisor(&api);

    supervisor.start(account()).await.unwrap();
    api.wait_for_fetches(1).await;

    let replacement = Account::new(Region::Us, "jane@example.com", "new-password").unwrap();
    supervisor.update(replacement).await.unwrap();
    // The replacement's first fetch is now waiting on the gate too.
    api.wait_for_fetches(2).await;

    gate.notify_waiters();
    sleep(Duration::from_secs(1)).await;

    // Only the new poller's cycle lands.
    assert_eq!(supervisor.sink().count(), 1);
    assert_eq!(api.logins(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_update_unknown_account() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);

    let other = Account::new(Region::Uk, "sam", "pw").unwrap();
    assert!(matches!(
        supervisor.update(other).await.unwrap_err(),
        SupervisorError::NotRunning(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_runs_cycle() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);
    let id = account().id();

    supervisor.start(account()).await.unwrap();
    sleep(Duration::from_secs(1)).await;

    let outcome = supervisor.refresh(&id).await.unwrap();
    assert!(matches!(outcome, CycleOutcome::Published(ref r) if r.is_success()));
    assert_eq!(supervisor.sink().count(), 2);

    let unknown = Account::new(Region::Uk, "sam", "pw").unwrap().id();
    assert!(supervisor.refresh(&unknown).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_accounts_poll_independently() {
    let api = Arc::new(ScriptedApi::new());
    let supervisor = supervisor(&api);
    let second = Account::new(Region::Uk, "sam", "pw").unwrap();

    supervisor.start(account()).await.unwrap();
    supervisor.start(second.clone()).await.unwrap();
    sleep(Duration::from_secs(1)).await;

    let results = supervisor.sink().results();
    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|(id, _)| *id == second.id()));
    assert_eq!(api.logins(), 2);

    supervisor.shutdown().await;
    assert!(supervisor.running().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_refresh_publish_discards() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(ScriptedApi::new());
    let sink = Arc::new(GatedSink::new(gate.clone()));
    let supervisor = Arc::new(PollingSupervisor::new(
        api.clone(),
        sink.clone(),
        PollSettings::default().with_interval(INTERVAL),
    ));
    let id = account().id();

    supervisor.start(account()).await.unwrap();
    sink.wait_for_publishes(1).await;
    gate.notify_one();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(sink.count(), 1);

    // Refresh runs on this caller's task, not the aborted poller task.
    let refresh = tokio::spawn({
        let supervisor = Arc::clone(&supervisor);
        let id = id.clone();
        async move { supervisor.refresh(&id).await }
    });
    sink.wait_for_publishes(2).await;

    supervisor.stop(&id).await.unwrap();
    gate.notify_one();

    assert_eq!(refresh.await.unwrap().unwrap(), CycleOutcome::Discarded);
    assert_eq!(sink.count(), 1);
}
