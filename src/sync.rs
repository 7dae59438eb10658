//! Session synchronizer: the only writer of [`AuthState`].
//!
//! DESIGN
//! ======
//! A cycle marks auth state as loading, fetches the session and hydrates
//! the snapshot concurrently, then commits `{user, loading: false}` once
//! both have settled. Overlapping `sync()` calls share one in-flight cycle
//! through a `Shared` future. The slot is cleared just before the commit,
//! so a `sync()` made in reaction to that commit starts a fresh cycle
//! instead of replaying the old result.
//!
//! ERROR HANDLING
//! ==============
//! A failed fetch settles as "signed out". It is never fatal and never
//! leaves the state loading.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::{AuthState, AuthStore};
use crate::error::SourceError;
use crate::persist::Persistence;
use crate::session::{Session, SessionSource};

/// Result of one synchronization cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Authenticated(Session),
    Anonymous,
    /// The source was unreachable; committed as signed out.
    Failed(SourceError),
}

impl SyncOutcome {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Anonymous | Self::Failed(_) => None,
        }
    }
}

type InFlight = Shared<LocalBoxFuture<'static, SyncOutcome>>;

/// Handle to the process-wide synchronizer. Clones share all state.
#[derive(Clone)]
pub struct Synchronizer {
    source: Rc<dyn SessionSource>,
    persistence: Persistence,
    auth: Rc<AuthStore>,
    in_flight: Rc<RefCell<Option<InFlight>>>,
    /// Bumped on entry to and exit from `sign_out`; cycles started under an
    /// older epoch do not commit.
    epoch: Rc<Cell<u64>>,
    mounted: Rc<Cell<bool>>,
}

impl Synchronizer {
    pub fn new(source: Rc<dyn SessionSource>, persistence: Persistence) -> Self {
        Self {
            source,
            persistence,
            auth: Rc::new(AuthStore::new()),
            in_flight: Rc::new(RefCell::new(None)),
            epoch: Rc::new(Cell::new(0)),
            mounted: Rc::new(Cell::new(false)),
        }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// First sync on application start. Later calls are no-ops returning
    /// `None`; use [`Synchronizer::sync`] to re-validate.
    pub async fn mount(&self) -> Option<SyncOutcome> {
        if self.mounted.replace(true) {
            debug!("synchronizer already mounted");
            return None;
        }
        Some(self.sync().await)
    }

    /// Fetch the session and commit it. Joins the in-flight cycle if one
    /// is running.
    pub async fn sync(&self) -> SyncOutcome {
        let cycle = {
            let mut slot = self.in_flight.borrow_mut();
            if let Some(running) = slot.as_ref() {
                debug!("joining in-flight session sync");
                running.clone()
            } else {
                let cycle = run_cycle(
                    Rc::clone(&self.source),
                    self.persistence.clone(),
                    Rc::clone(&self.auth),
                    Rc::downgrade(&self.in_flight),
                    Rc::clone(&self.epoch),
                )
                .boxed_local()
                .shared();
                *slot = Some(cycle.clone());
                cycle
            }
        };
        cycle.await
    }

    /// End the session: tell the source, forget the cached copy, and
    /// publish signed-out. No cycle started before or during this call
    /// will overwrite it.
    pub async fn sign_out(&self) {
        self.epoch.set(self.epoch.get() + 1);
        if let Err(e) = self.source.end_session().await {
            warn!(error = %e, "identity service sign-out failed; clearing local session anyway");
        }
        // A cycle that started while the service was still ending the
        // session may carry a pre-logout answer.
        self.epoch.set(self.epoch.get() + 1);
        self.persistence.remember_session(None);
        self.auth.reset();
        info!("signed out");
    }

    /// Re-sync on every change the source pushes. Returns when the source
    /// has no subscription or closes it.
    pub async fn follow_source(&self) {
        let Some(mut changes) = self.source.subscribe() else {
            debug!("session source has no change feed");
            return;
        };
        while changes.changed().await.is_ok() {
            debug!("session source reported a change");
            self.sync().await;
        }
    }

    /// Re-sync every `period`, starting one period from now.
    #[cfg(feature = "native")]
    pub async fn revalidate_every(&self, period: std::time::Duration) {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!(period_secs = period.as_secs(), "periodic session revalidation");
            self.sync().await;
        }
    }
}

async fn run_cycle(
    source: Rc<dyn SessionSource>,
    persistence: Persistence,
    auth: Rc<AuthStore>,
    slot: Weak<RefCell<Option<InFlight>>>,
    epoch: Rc<Cell<u64>>,
) -> SyncOutcome {
    let started_in = epoch.get();
    if auth.begin_cycle() {
        debug!("session sync started; auth state loading");
    }

    // Hydration must settle before the commit, but it does not need to
    // delay the fetch.
    let (fetched, ()) = futures::join!(source.fetch_session(), persistence.hydrate());

    let outcome = match fetched {
        Ok(Some(session)) => SyncOutcome::Authenticated(session),
        Ok(None) => SyncOutcome::Anonymous,
        Err(e) => {
            warn!(error = %e, "session fetch failed; treating caller as signed out");
            SyncOutcome::Failed(e)
        }
    };

    if let Some(slot) = slot.upgrade() {
        slot.borrow_mut().take();
    }

    if epoch.get() != started_in {
        debug!("sign-out happened during sync; dropping result");
        return outcome;
    }

    let user = outcome.session().cloned();
    if let (Some(cached), Some(fresh)) = (persistence.cached_session(), user.as_ref()) {
        if !cached.is_same_identity(fresh) {
            info!(cached = %cached.user_id, fresh = %fresh.user_id, "session changed identity since last run");
        }
    }
    persistence.remember_session(user.clone());
    info!(authenticated = user.is_some(), "session sync committed");
    auth.commit(user);
    outcome
}
