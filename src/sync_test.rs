use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::*;
use crate::error::StoreError;
use crate::persist::{MemoryStore, PersistedSnapshot, PersistedStore};

// =============================================================================
// Test doubles
// =============================================================================

/// Source that replays scripted responses and can hold each fetch until
/// released.
#[derive(Default)]
struct ScriptedSource {
    responses: RefCell<VecDeque<Result<Option<Session>, SourceError>>>,
    fetches: Cell<usize>,
    sign_outs: Cell<usize>,
    hold: Option<Rc<Notify>>,
    logout_hold: Option<Rc<Notify>>,
    changes: Option<watch::Receiver<u64>>,
}

impl ScriptedSource {
    fn replying(responses: Vec<Result<Option<Session>, SourceError>>) -> Self {
        Self { responses: RefCell::new(responses.into()), ..Default::default() }
    }

    fn held(mut self, release: &Rc<Notify>) -> Self {
        self.hold = Some(Rc::clone(release));
        self
    }

    fn logout_held(mut self, release: &Rc<Notify>) -> Self {
        self.logout_hold = Some(Rc::clone(release));
        self
    }
}

#[async_trait(?Send)]
impl SessionSource for ScriptedSource {
    async fn fetch_session(&self) -> Result<Option<Session>, SourceError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(release) = &self.hold {
            release.notified().await;
        }
        self.responses.borrow_mut().pop_front().unwrap_or(Ok(None))
    }

    async fn end_session(&self) -> Result<(), SourceError> {
        self.sign_outs.set(self.sign_outs.get() + 1);
        if let Some(release) = &self.logout_hold {
            release.notified().await;
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        self.changes.clone()
    }
}

/// Store whose load fails, or blocks until released.
struct SlowStore {
    release: Option<Rc<Notify>>,
}

#[async_trait(?Send)]
impl PersistedStore for SlowStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        match &self.release {
            Some(release) => {
                release.notified().await;
                Ok(None)
            }
            None => Err(StoreError::Io("permission denied".to_owned())),
        }
    }

    fn save(&self, _blob: String) {}

    fn clear(&self) {}
}

fn alice() -> Session {
    Session::new("u1").with_display_name("Alice")
}

fn synchronizer(source: &Rc<ScriptedSource>) -> Synchronizer {
    Synchronizer::new(Rc::clone(source) as Rc<dyn SessionSource>, Persistence::new(MemoryStore::new()))
}

// =============================================================================
// Outcomes
// =============================================================================

#[tokio::test]
async fn sync_commits_authenticated_user() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]));
    let sync = synchronizer(&source);
    assert_eq!(sync.auth().current(), AuthState::unknown());

    let outcome = sync.sync().await;

    assert_eq!(outcome, SyncOutcome::Authenticated(alice()));
    assert_eq!(sync.auth().current(), AuthState::settled(Some(alice())));
}

#[tokio::test]
async fn sync_commits_anonymous() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(None)]));
    let sync = synchronizer(&source);

    assert_eq!(sync.sync().await, SyncOutcome::Anonymous);
    assert_eq!(sync.auth().current(), AuthState::settled(None));
}

#[tokio::test]
async fn failed_fetch_settles_signed_out() {
    let err = SourceError::Transport("connection refused".to_owned());
    let source = Rc::new(ScriptedSource::replying(vec![Err(err.clone())]));
    let sync = synchronizer(&source);

    assert_eq!(sync.sync().await, SyncOutcome::Failed(err));
    assert_eq!(sync.auth().current(), AuthState::settled(None));
}

#[tokio::test]
async fn failed_fetch_drops_previously_confirmed_user() {
    let source = Rc::new(ScriptedSource::replying(vec![
        Ok(Some(alice())),
        Err(SourceError::Status(503)),
    ]));
    let sync = synchronizer(&source);
    sync.sync().await;

    sync.sync().await;

    assert_eq!(sync.auth().current(), AuthState::settled(None));
}

// =============================================================================
// Single flight
// =============================================================================

#[tokio::test]
async fn overlapping_syncs_share_one_fetch() {
    let release = Rc::new(Notify::new());
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]).held(&release));
    let sync = synchronizer(&source);

    let (first, second, ()) = futures::join!(sync.sync(), sync.sync(), async {
        tokio::task::yield_now().await;
        release.notify_one();
    });

    assert_eq!(source.fetches.get(), 1);
    assert_eq!(first, SyncOutcome::Authenticated(alice()));
    assert_eq!(second, first);
}

#[tokio::test]
async fn sync_after_commit_starts_fresh_cycle() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice())), Ok(None)]));
    let sync = synchronizer(&source);

    sync.sync().await;
    let second = sync.sync().await;

    assert_eq!(source.fetches.get(), 2);
    assert_eq!(second, SyncOutcome::Anonymous);
}

// =============================================================================
// Loading flag
// =============================================================================

#[tokio::test]
async fn loading_holds_until_fetch_resolves() {
    let release = Rc::new(Notify::new());
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]).held(&release));
    let sync = synchronizer(&source);
    let auth = sync.subscribe();

    futures::join!(sync.sync(), async {
        tokio::task::yield_now().await;
        assert!(auth.borrow().loading, "still loading while the fetch is pending");
        release.notify_one();
    });

    assert!(!auth.borrow().loading);
}

#[tokio::test]
async fn resync_marks_loading_and_keeps_previous_user_until_commit() {
    let release = Rc::new(Notify::new());
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice())), Ok(None)]).held(&release));
    let sync = synchronizer(&source);
    release.notify_one();
    sync.sync().await;
    assert_eq!(sync.auth().current(), AuthState::settled(Some(alice())));

    futures::join!(sync.sync(), async {
        tokio::task::yield_now().await;
        let during = sync.auth().current();
        assert!(during.loading);
        assert!(during.authoritative_user().is_none());
        release.notify_one();
    });

    assert_eq!(sync.auth().current(), AuthState::settled(None));
}

#[tokio::test]
async fn loading_stays_false_without_resync() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(None)]));
    let sync = synchronizer(&source);
    let mut auth = sync.subscribe();
    sync.sync().await;
    auth.borrow_and_update();

    tokio::task::yield_now().await;

    assert!(!auth.has_changed().unwrap());
    assert!(!auth.borrow().loading);
}

// =============================================================================
// Hydration ordering
// =============================================================================

#[tokio::test]
async fn commit_waits_for_hydration() {
    let release = Rc::new(Notify::new());
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]));
    let store = SlowStore { release: Some(Rc::clone(&release)) };
    let sync = Synchronizer::new(Rc::clone(&source) as Rc<dyn SessionSource>, Persistence::new(store));

    futures::join!(sync.sync(), async {
        tokio::task::yield_now().await;
        assert_eq!(source.fetches.get(), 1, "fetch runs alongside hydration");
        assert!(sync.auth().current().loading, "no commit before hydration settles");
        release.notify_one();
    });

    assert_eq!(sync.auth().current(), AuthState::settled(Some(alice())));
}

#[tokio::test]
async fn hydration_failure_does_not_stall() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(None)]));
    let sync = Synchronizer::new(
        Rc::clone(&source) as Rc<dyn SessionSource>,
        Persistence::new(SlowStore { release: None }),
    );

    sync.sync().await;

    assert_eq!(sync.auth().current(), AuthState::settled(None));
    assert!(sync.persistence().is_hydrated());
}

#[tokio::test]
async fn confirmed_session_is_remembered() {
    let store = MemoryStore::new();
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]));
    let sync = Synchronizer::new(Rc::clone(&source) as Rc<dyn SessionSource>, Persistence::new(store.clone()));

    sync.sync().await;

    let saved = PersistedSnapshot::decode(&store.blob().unwrap()).unwrap().unwrap();
    assert_eq!(saved.session, Some(alice()));
}

#[tokio::test]
async fn cached_session_is_not_published_before_confirmation() {
    let snapshot = PersistedSnapshot { session: Some(alice()), ..Default::default() };
    let store = MemoryStore::with_blob(snapshot.encode().unwrap());
    let source = Rc::new(ScriptedSource::replying(vec![Ok(None)]));
    let sync = Synchronizer::new(Rc::clone(&source) as Rc<dyn SessionSource>, Persistence::new(store));

    sync.sync().await;

    assert_eq!(sync.auth().current(), AuthState::settled(None));
    assert!(sync.persistence().cached_session().is_none());
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn mount_runs_once() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]));
    let sync = synchronizer(&source);

    assert_eq!(sync.mount().await, Some(SyncOutcome::Authenticated(alice())));
    assert_eq!(sync.mount().await, None);
    assert_eq!(source.fetches.get(), 1);
}

#[tokio::test]
async fn sign_out_resets_state_and_cache() {
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]));
    let sync = synchronizer(&source);
    sync.sync().await;

    sync.sign_out().await;

    assert_eq!(source.sign_outs.get(), 1);
    assert_eq!(sync.auth().current(), AuthState::settled(None));
    assert!(sync.persistence().cached_session().is_none());
}

#[tokio::test]
async fn sign_out_during_sync_is_not_overwritten() {
    let release = Rc::new(Notify::new());
    let source = Rc::new(ScriptedSource::replying(vec![Ok(Some(alice()))]).held(&release));
    let sync = synchronizer(&source);

    futures::join!(sync.sync(), async {
        tokio::task::yield_now().await;
        sync.sign_out().await;
        release.notify_one();
    });

    assert_eq!(sync.auth().current(), AuthState::settled(None));
}

#[tokio::test]
async fn sync_started_while_signing_out_does_not_restore_session() {
    let fetch_release = Rc::new(Notify::new());
    let logout_release = Rc::new(Notify::new());
    let source = Rc::new(
        ScriptedSource::replying(vec![Ok(Some(alice()))])
            .held(&fetch_release)
            .logout_held(&logout_release),
    );
    let sync = synchronizer(&source);

    // sign_out is polled first and parks on the service; the sync starts
    // behind it and its fetch answers with the pre-logout session.
    let (_, outcome) = futures::join!(sync.sign_out(), async {
        tokio::task::yield_now().await;
        let (outcome, ()) = futures::join!(sync.sync(), async {
            tokio::task::yield_now().await;
            logout_release.notify_one();
            tokio::task::yield_now().await;
            fetch_release.notify_one();
        });
        outcome
    });

    assert_eq!(outcome, SyncOutcome::Authenticated(alice()));
    assert_eq!(source.sign_outs.get(), 1);
    assert_eq!(sync.auth().current(), AuthState::settled(None));
    assert!(sync.persistence().cached_session().is_none());
}

#[tokio::test]
async fn follow_source_resyncs_on_change() {
    let (changes_tx, changes_rx) = watch::channel(0_u64);
    let source = Rc::new(ScriptedSource {
        responses: RefCell::new(vec![Ok(Some(alice()))].into()),
        changes: Some(changes_rx),
        ..Default::default()
    });
    let sync = synchronizer(&source);

    futures::join!(sync.follow_source(), async move {
        changes_tx.send_replace(1);
        tokio::task::yield_now().await;
        drop(changes_tx);
    });

    assert_eq!(source.fetches.get(), 1);
    assert_eq!(sync.auth().current(), AuthState::settled(Some(alice())));
}

#[tokio::test]
async fn follow_source_without_feed_returns() {
    let source = Rc::new(ScriptedSource::default());
    let sync = synchronizer(&source);
    sync.follow_source().await;
    assert_eq!(source.fetches.get(), 0);
}

#[cfg(feature = "native")]
#[tokio::test(start_paused = true)]
async fn revalidate_every_resyncs_each_period() {
    let source = Rc::new(ScriptedSource::default());
    let sync = synchronizer(&source);

    tokio::select! {
        () = sync.revalidate_every(Duration::from_secs(60)) => {}
        () = tokio::time::sleep(Duration::from_secs(150)) => {}
    }

    assert_eq!(source.fetches.get(), 2);
}
