//! mouse-hold-daemon: holds a mouse button down until told to let go
//!
//! This daemon provides:
//! - A hold controller that injects a synthetic left or right button-down
//!   and the matching button-up on the next toggle
//! - An optional global hotkey (F6) that toggles the hold
//! - IPC server for a settings window (button choice, hotkey checkbox,
//!   English/Russian labels, status readout)
//!
//! A held button is always released, and the hotkey unregistered, before
//! the process exits.

mod config;
mod events;
mod hotkey;
mod i18n;
mod inject;
mod ipc;
mod lifecycle;
mod settings;
mod state;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::StateEvent;
use crate::hotkey::{PlatformHotkeyBackend, TOGGLE_HOTKEY};
use crate::inject::PlatformInjector;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::settings::SettingsStore;
use crate::state::Dispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "mouse-hold-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, ?config.settings_path, "configuration loaded");

    let store = SettingsStore::new(&config.settings_path);
    let settings = store.load_or_default();
    info!(
        language = settings.language.code(),
        button = %settings.button,
        "settings loaded"
    );

    let mut shutdown = ShutdownSignal::new().context("failed to install signal handlers")?;

    // Hotkey backend and IPC clients -> dispatcher
    let (event_tx, event_rx) = mpsc::channel(32);
    // Dispatcher -> subscribed IPC clients
    let (state_tx, _state_rx) = broadcast::channel::<StateEvent>(64);

    let mut dispatcher = Dispatcher::new(
        PlatformInjector::new(),
        PlatformHotkeyBackend::new(event_tx.clone()),
        TOGGLE_HOTKEY,
        store,
        settings,
        state_tx.clone(),
    );

    let server = Server::new(&config.socket_path, event_tx, state_tx.clone())?;
    let mut log_rx = state_tx.subscribe();

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Owns all state; returns after a shutdown request
        _ = dispatcher.run(event_rx) => {
            info!("dispatcher exited");
        }

        // Accept client connections
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Trace every state event
        _ = async {
            loop {
                match log_rx.recv().await {
                    Ok(event) => info!(%event, "state event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "state event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("state event logger exited");
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    // Cleanup: release first, then unregister
    info!("shutting down...");

    let _ = dispatcher.shutdown();
    server.shutdown().await;

    info!("mouse-hold-daemon stopped");

    Ok(())
}
