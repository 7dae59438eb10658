use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::auth::AuthStore;
use crate::session::Session;

/// Navigator that records every call.
#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<(String, NavigateOptions)>>>);

impl Recorder {
    fn paths(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(p, _)| p.clone()).collect()
    }
}

impl Navigator for Recorder {
    fn navigate(&self, path: &str, options: NavigateOptions) {
        self.0.borrow_mut().push((path.to_owned(), options));
    }
}

fn gate() -> RouteGate {
    RouteGate::new("/login", "/account")
}

fn granted() -> AuthState {
    AuthState::settled(Some(Session::new("u1")))
}

fn denied() -> AuthState {
    AuthState::settled(None)
}

// =============================================================================
// evaluate
// =============================================================================

#[test]
fn unknown_waits_without_navigation() {
    let mut g = gate();
    assert_eq!(g.evaluate(&AuthState::unknown(), Some("/account/orders")), GateStep::Wait);
}

#[test]
fn loading_with_cached_user_still_waits() {
    let mut g = gate();
    let state = AuthState { user: Some(Session::new("u1")), loading: true };
    assert_eq!(g.evaluate(&state, Some("/account")), GateStep::Wait);
}

#[test]
fn granted_renders() {
    let mut g = gate();
    assert_eq!(g.evaluate(&granted(), Some("/account")), GateStep::Render);
    assert_eq!(GateStep::Render.view(), GateView::Content);
}

#[test]
fn denied_redirects_with_encoded_return_path() {
    let mut g = gate();
    assert_eq!(
        g.evaluate(&denied(), Some("/account/orders")),
        GateStep::Redirect("/login?returnUrl=%2Faccount%2Forders".to_owned())
    );
}

#[test]
fn denied_without_path_uses_fallback() {
    let mut g = gate();
    assert_eq!(g.evaluate(&denied(), None), GateStep::Redirect("/login?returnUrl=%2Faccount".to_owned()));
}

#[test]
fn repeated_denied_evaluations_redirect_once() {
    let mut g = gate();
    let steps: Vec<_> = (0..50).map(|_| g.evaluate(&denied(), Some("/account"))).collect();
    let redirects = steps.iter().filter(|s| matches!(s, GateStep::Redirect(_))).count();
    assert_eq!(redirects, 1);
    assert!(steps[1..].iter().all(|s| *s == GateStep::Hold));
}

#[test]
fn leaving_denied_rearms_latch() {
    let mut g = gate();
    assert!(matches!(g.evaluate(&denied(), Some("/account")), GateStep::Redirect(_)));
    assert_eq!(g.evaluate(&granted(), Some("/account")), GateStep::Render);
    assert!(matches!(g.evaluate(&denied(), Some("/account")), GateStep::Redirect(_)));
}

#[test]
fn placeholder_for_every_non_render_step() {
    assert_eq!(GateStep::Wait.view(), GateView::Placeholder);
    assert_eq!(GateStep::Hold.view(), GateView::Placeholder);
    assert_eq!(GateStep::Redirect("/login".to_owned()).view(), GateView::Placeholder);
}

#[test]
fn from_config_uses_configured_paths() {
    let config = GateConfig {
        login_path: "/signin".to_owned(),
        default_protected_path: "/me".to_owned(),
        ..GateConfig::default()
    };
    let mut g = RouteGate::from_config(&config);
    assert_eq!(g.evaluate(&denied(), Some("")), GateStep::Redirect("/signin?returnUrl=%2Fme".to_owned()));
}

// =============================================================================
// observe
// =============================================================================

#[test]
fn observe_pushes_redirect_once() {
    let mut g = gate();
    let nav = Recorder::default();
    for _ in 0..10 {
        assert_eq!(g.observe(&denied(), Some("/account/orders"), &nav), GateView::Placeholder);
    }
    let calls = nav.0.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/login?returnUrl=%2Faccount%2Forders");
    assert!(!calls[0].1.replace, "login redirect keeps history");
}

#[test]
fn closures_are_navigators() {
    let seen = RefCell::new(Vec::new());
    let nav = |path: &str, _: NavigateOptions| seen.borrow_mut().push(path.to_owned());
    let mut g = gate();
    g.observe(&denied(), Some("/account"), &nav);
    assert_eq!(*seen.borrow(), vec!["/login?returnUrl=%2Faccount".to_owned()]);
}

// =============================================================================
// drive_gate
// =============================================================================

#[tokio::test]
async fn driver_follows_state_changes() {
    let store = AuthStore::new();
    let nav = Recorder::default();
    let (views_tx, views_rx) = watch::channel(GateView::Placeholder);
    let driver = drive_gate(gate(), store.subscribe(), Some("/account/orders".to_owned()), nav.clone(), views_tx);

    futures::join!(driver, async {
        tokio::task::yield_now().await;
        assert_eq!(*views_rx.borrow(), GateView::Placeholder);
        assert!(nav.paths().is_empty(), "no navigation while unknown");

        store.commit(None);
        tokio::task::yield_now().await;
        assert_eq!(nav.paths(), vec!["/login?returnUrl=%2Faccount%2Forders".to_owned()]);

        // Re-render storm while still denied.
        for _ in 0..5 {
            store.commit(None);
            tokio::task::yield_now().await;
        }
        assert_eq!(nav.paths().len(), 1);

        store.commit(Some(Session::new("u1")));
        tokio::task::yield_now().await;
        assert_eq!(*views_rx.borrow(), GateView::Content);

        // Session expired mid-visit.
        store.commit(None);
        tokio::task::yield_now().await;
        assert_eq!(*views_rx.borrow(), GateView::Placeholder);
        assert_eq!(nav.paths().len(), 2);

        drop(views_rx);
    });
}

#[tokio::test]
async fn driver_stops_after_unmount() {
    let store = AuthStore::new();
    let nav = Recorder::default();
    let (views_tx, views_rx) = watch::channel(GateView::Placeholder);
    store.commit(None);

    futures::join!(
        drive_gate(gate(), store.subscribe(), Some("/account".to_owned()), nav.clone(), views_tx),
        async {
            tokio::task::yield_now().await;
            drop(views_rx);
        }
    );

    // The redirect issued before unmount stands; later changes reach no one.
    store.commit(Some(Session::new("u1")));
    store.commit(None);
    assert_eq!(nav.paths(), vec!["/login?returnUrl=%2Faccount".to_owned()]);
}

#[tokio::test]
async fn driver_stops_when_store_dropped() {
    let store = AuthStore::new();
    let (views_tx, _views_rx) = watch::channel(GateView::Placeholder);
    let states = store.subscribe();
    drop(store);

    drive_gate(gate(), states, None, Recorder::default(), views_tx).await;
}
