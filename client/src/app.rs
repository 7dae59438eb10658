//! Root application component.
//!
//! SYSTEM CONTEXT
//! ==============
//! Provides the auth signal, gate config, and session command channel via
//! context, then mounts the router inside the storefront shell. On hydrate
//! it starts the single session task that owns the synchronizer.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;
use storefront::{AuthState, GateConfig};

use crate::components::shell::StorefrontShell;
use crate::pages::account::{AccountPage, OrdersPage};
use crate::pages::admin::CatalogAdminPage;
use crate::pages::home::{HomePage, NotFoundPage};
use crate::pages::login::LoginPage;
use crate::pages::shop::ShopPage;
use crate::state::auth::SessionCommands;

/// How often the browser re-validates the session while the tab is open.
#[cfg(feature = "hydrate")]
const REVALIDATE_EVERY: std::time::Duration = std::time::Duration::from_secs(300);

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = GateConfig::default();
    let auth = RwSignal::new(AuthState::unknown());
    let (commands, command_rx) = SessionCommands::channel();
    provide_context(auth);
    provide_context(commands);
    provide_context(config.clone());

    #[cfg(feature = "hydrate")]
    spawn_session_task(config, auth, command_rx);
    #[cfg(not(feature = "hydrate"))]
    drop((config, command_rx));

    view! {
        <Title text="Storefront"/>
        <Router>
            <StorefrontShell>
                <Routes fallback=|| view! { <NotFoundPage/> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/shop") view=ShopPage/>
                    <Route path=path!("/login") view=LoginPage/>
                    <Route path=path!("/account") view=AccountPage/>
                    <Route path=path!("/account/orders") view=OrdersPage/>
                    <Route path=path!("/admin/catalog") view=CatalogAdminPage/>
                </Routes>
            </StorefrontShell>
        </Router>
    }
}

/// Own the synchronizer for the lifetime of the page.
///
/// Mirrors every auth-state change into `auth`, runs the initial sync,
/// serves `SessionCommands`, re-validates on a timer, and re-syncs when
/// another tab rewrites the session snapshot.
#[cfg(feature = "hydrate")]
fn spawn_session_task(
    config: GateConfig,
    auth: RwSignal<AuthState>,
    mut commands: futures::channel::mpsc::UnboundedReceiver<crate::state::auth::SessionCommand>,
) {
    use std::rc::Rc;

    use futures::StreamExt;
    use storefront::{Persistence, Synchronizer};

    use crate::net::session::BrowserSessionSource;
    use crate::net::storage::LocalStorageStore;
    use crate::state::auth::SessionCommand;

    leptos::task::spawn_local(async move {
        let source = BrowserSessionSource::from_config(&config);
        let persistence = Persistence::new(LocalStorageStore::new(config.storage_key.clone()));
        let sync = Synchronizer::new(Rc::new(source), persistence);

        let mut states = sync.subscribe();
        let publish = async move {
            loop {
                auth.set(states.borrow_and_update().clone());
                if states.changed().await.is_err() {
                    break;
                }
            }
        };
        let serve_commands = async {
            while let Some(command) = commands.next().await {
                log::debug!("session command: {command:?}");
                match command {
                    SessionCommand::Resync => {
                        sync.sync().await;
                    }
                    SessionCommand::SignOut => sync.sign_out().await,
                }
            }
        };
        let revalidate = async {
            loop {
                gloo_timers::future::sleep(REVALIDATE_EVERY).await;
                sync.sync().await;
            }
        };

        futures::join!(
            async {
                sync.mount().await;
            },
            publish,
            serve_commands,
            revalidate,
            sync.follow_source(),
        );
    });
}
