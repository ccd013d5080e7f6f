//! # linkflip-client
//!
//! Application layer of LinkFlip: the [`state::AppState`] that owns the
//! profile and settings, the flip timers, and the command handlers a front
//! end calls. [`bootstrap`] wires storage and the broadcast controller from a
//! [`ClientConfig`].

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod flip;
pub mod state;
pub mod theme;

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use linkflip_nfc::{BroadcastController, HardwareEmitter, SoftEmitter};
use linkflip_shared::constants::APP_NAME;
use linkflip_store::{Database, DocumentStore, MemoryBackend};

pub use config::ClientConfig;
pub use error::StateError;
pub use events::StateEvent;
pub use state::{AppState, PendingSave};

/// Install the global log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("linkflip_client=debug,linkflip_store=info,linkflip_nfc=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Open the on-disk store, falling back to memory when the database cannot
/// be opened.
pub fn open_store(config: &ClientConfig) -> DocumentStore {
    let opened = match &config.data_dir {
        Some(dir) => Database::open_in(dir),
        None => Database::new(),
    };
    match opened {
        Ok(db) => DocumentStore::new(Arc::new(db)),
        Err(e) => {
            tracing::warn!(error = %e, "Could not open database, changes will not be kept");
            DocumentStore::new(Arc::new(MemoryBackend::new()))
        }
    }
}

/// The hardware emitter for this host, if any.
pub fn resolve_emitter(config: &ClientConfig) -> Option<Arc<dyn HardwareEmitter>> {
    if config.soft_nfc {
        tracing::info!("Using in-process broadcast emitter");
        Some(Arc::new(SoftEmitter::new()))
    } else {
        None
    }
}

/// Build the application state. Must be called inside a Tokio runtime.
pub async fn bootstrap(config: &ClientConfig) -> AppState {
    tracing::info!(app = APP_NAME, "Starting");
    let store = open_store(config);
    let broadcaster = BroadcastController::spawn(resolve_emitter(config));
    let mut state = AppState::new(store, broadcaster, config);
    state.settle_broadcast().await;
    state
}
