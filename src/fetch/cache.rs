//! TTL cache for the last successful snapshot.
//!
//! The dashboard must always render: a refresh failure serves the stale
//! snapshot instead of an error, and only a cold cache with a dead
//! upstream surfaces as a failure to the caller.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use metrics::gauge;
use tokio::sync::Mutex;

use crate::snapshot::EconomicSnapshot;

use super::SnapshotSource;

pub const ENV_TTL_SECS: &str = "SNAPSHOT_CACHE_TTL_SECS";
/// Matches the original deployment's 6-hour `s-maxage`.
const DEFAULT_TTL_SECS: u64 = 6 * 3600;

/// Cache outcome, surfaced to clients via the `X-Snapshot-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Refresh failed; serving the previous snapshot past its TTL.
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

#[derive(Debug, Clone)]
struct Cached {
    fetched_at: Instant,
    fetched_unix: u64,
    snapshot: EconomicSnapshot,
}

#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    inner: Mutex<Option<Cached>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(None),
        }
    }

    /// TTL from `SNAPSHOT_CACHE_TTL_SECS`, defaulting to 6 hours.
    pub fn from_env() -> Self {
        let secs = std::env::var(ENV_TTL_SECS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TTL_SECS);
        Self::new(Duration::from_secs(secs))
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Return the cached snapshot if fresh; otherwise fetch. On fetch
    /// failure a stale snapshot (if any) is served; only a cold cache
    /// propagates the error.
    pub async fn get_or_refresh(
        &self,
        source: &dyn SnapshotSource,
    ) -> Result<(EconomicSnapshot, CacheStatus, u64)> {
        let mut guard = self.inner.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return Ok((cached.snapshot.clone(), CacheStatus::Hit, cached.fetched_unix));
            }
        }

        match source.fetch().await {
            Ok(snapshot) => {
                let fetched_unix = now_unix();
                gauge!("snapshot_last_refresh_ts").set(fetched_unix as f64);
                *guard = Some(Cached {
                    fetched_at: Instant::now(),
                    fetched_unix,
                    snapshot: snapshot.clone(),
                });
                Ok((snapshot, CacheStatus::Miss, fetched_unix))
            }
            Err(e) => {
                if let Some(cached) = guard.as_ref() {
                    tracing::warn!(error = ?e, source = source.name(), "refresh failed, serving stale snapshot");
                    return Ok((
                        cached.snapshot.clone(),
                        CacheStatus::Stale,
                        cached.fetched_unix,
                    ));
                }
                Err(e).with_context(|| format!("cold fetch from source '{}'", source.name()))
            }
        }
    }

    /// Unconditional refresh (background scheduler path). Keeps the old
    /// snapshot on failure.
    pub async fn force_refresh(&self, source: &dyn SnapshotSource) -> Result<EconomicSnapshot> {
        let snapshot = source.fetch().await?;
        let fetched_unix = now_unix();
        gauge!("snapshot_last_refresh_ts").set(fetched_unix as f64);
        let mut guard = self.inner.lock().await;
        *guard = Some(Cached {
            fetched_at: Instant::now(),
            fetched_unix,
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
