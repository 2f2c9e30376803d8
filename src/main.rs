//! Ezeiza Index binary entrypoint.
//! Boots the Axum HTTP server: state, routes, metrics, and the
//! background snapshot refresh loop.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ezeiza_index::api::{self, AppState};
use ezeiza_index::fetch::scheduler::{spawn_refresh_scheduler, RefreshSchedulerCfg};
use ezeiza_index::metrics::Metrics;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - EZEIZA_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("EZEIZA_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ezeiza=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments. This enables
    // INDEX_WEIGHTS_PATH / SNAPSHOT_CACHE_TTL_SECS overrides from .env.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let state = AppState::from_env();

    let metrics = Metrics::init(state.cache().ttl_secs());

    // Keep the cache warm and the history populated between requests.
    spawn_refresh_scheduler(state.clone(), RefreshSchedulerCfg::from_env());

    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
