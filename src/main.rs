//! `session-probe`: run the session gate once from the command line.
//!
//! Hydrates the file-backed snapshot, syncs against the identity service,
//! then prints what a protected section at `--path` would do and whether
//! the path gets storefront chrome. With `--watch`, keeps re-validating on
//! the configured interval and prints each gate transition until Ctrl-C.

use std::rc::Rc;

use clap::Parser;
use storefront::http_source::HttpSessionSource;
use storefront::persist::JsonFileStore;
use storefront::{GateConfig, GateView, LayoutDecision, NavigateOptions, Persistence, RouteGate, Synchronizer};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "session-probe", about = "Check the storefront session gate against the identity service")]
struct Cli {
    /// Navigation path of the protected section to evaluate.
    #[arg(long, default_value = "/account")]
    path: String,

    /// Session cookie forwarded to the identity service.
    #[arg(long, env = "STOREFRONT_SESSION_COOKIE")]
    cookie: Option<String>,

    /// Sign out before exiting.
    #[arg(long)]
    sign_out: bool,

    /// Keep re-validating and report gate transitions.
    #[arg(long)]
    watch: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = GateConfig::from_env()?;

    let store = JsonFileStore::spawn(config.snapshot_path.clone());
    let persistence = Persistence::new(store.clone());
    let source = HttpSessionSource::from_config(&config, cli.cookie.as_deref())?;
    let sync = Synchronizer::new(Rc::new(source), persistence);

    let outcome = sync.mount().await;
    tracing::info!(?outcome, cached = ?sync.persistence().cached_session(), "initial sync finished");

    let layout = LayoutDecision::for_path(Some(&cli.path));
    let mut gate = RouteGate::from_config(&config);
    let step = gate.evaluate(&sync.auth().current(), Some(&cli.path));
    println!("path:   {}", cli.path);
    println!("chrome: {}", layout.apply_storefront_chrome);
    println!("gate:   {step:?}");
    if let Some(user) = sync.auth().current().authoritative_user() {
        println!("user:   {} ({})", user.label(), user.user_id);
    }

    if cli.watch {
        watch_gate(&sync, &config, &cli.path).await;
    }

    if cli.sign_out {
        sync.sign_out().await;
        println!("signed out");
    }

    store.flushed().await;
    Ok(())
}

async fn watch_gate(sync: &Synchronizer, config: &GateConfig, path: &str) {
    let Some(period) = config.revalidate_interval() else {
        tracing::warn!("--watch needs STOREFRONT_REVALIDATE_SECS; nothing to watch");
        return;
    };

    let (views_tx, mut views_rx) = watch::channel(GateView::Placeholder);
    let navigator = |url: &str, options: NavigateOptions| {
        println!("navigate: {url} (replace: {})", options.replace);
    };
    let driver = storefront::gate::drive_gate(
        RouteGate::from_config(config),
        sync.subscribe(),
        Some(path.to_owned()),
        navigator,
        views_tx,
    );
    let report = async {
        while views_rx.changed().await.is_ok() {
            println!("view: {:?}", *views_rx.borrow_and_update());
        }
    };

    tokio::select! {
        () = sync.revalidate_every(period) => {}
        () = driver => {}
        () = report => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "ctrl-c handler failed");
            }
        }
    }
}
