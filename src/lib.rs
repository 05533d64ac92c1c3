// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod guide;
pub mod metrics;
pub mod model;
pub mod providers;
pub mod random;
pub mod resolve;
pub mod state;
pub mod trips;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::state::{AppState, Collaborators, Settings};

use axum::Router;
use tracing::info;

/// Build the full application router from the process environment.
///
/// `/metrics` is mounted only when `DEBUG_ROUTES=1`; the recorder is installed either way
/// so counters are collected from the first request.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::from_env()?;
    let state = AppState::from_config(&cfg)?;
    let _ = crate::metrics::handle();

    let mut router = api::router(state);
    if cfg.debug_routes {
        router = router.merge(crate::metrics::router());
        info!("debug routes enabled (/metrics)");
    }
    Ok(router)
}
