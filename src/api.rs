use std::sync::{Arc, RwLock};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics::gauge;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::IndexConfig;
use crate::derive;
use crate::fetch::cache::{CacheStatus, SnapshotCache};
use crate::fetch::{LiveSource, SnapshotSource};
use crate::history::{History, HistoryEntry};
use crate::index::{compute_index, IndexReport};
use crate::snapshot::EconomicSnapshot;

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn SnapshotSource>,
    cache: Arc<SnapshotCache>,
    weights: Arc<RwLock<IndexConfig>>,
    history: Arc<History>,
}

impl AppState {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            source,
            cache: Arc::new(SnapshotCache::from_env()),
            weights: Arc::new(RwLock::new(IndexConfig::load_default())),
            history: Arc::new(History::with_capacity(2000)),
        }
    }

    /// Production wiring: live providers behind the TTL cache.
    pub fn from_env() -> Self {
        Self::new(Arc::new(LiveSource::from_env()))
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    fn current_config(&self) -> IndexConfig {
        self.weights.read().expect("weights rwlock poisoned").clone()
    }

    fn record(&self, report: &IndexReport) {
        gauge!("sentiment_index_value").set(report.index);
        self.history.push(report);
    }

    /// Compute the report from the cached-or-fresh snapshot.
    async fn report(&self) -> anyhow::Result<(IndexReport, EconomicSnapshot, CacheStatus, u64)> {
        let (snapshot, status, cached_at) = self.cache.get_or_refresh(&*self.source).await?;
        let cfg = self.current_config();
        let report = compute_index(&snapshot, &cfg, chrono::Utc::now().date_naive());
        self.record(&report);
        Ok((report, snapshot, status, cached_at))
    }

    /// Scheduler path: unconditional refresh, then recompute.
    pub async fn refresh_and_record(&self) -> anyhow::Result<IndexReport> {
        let snapshot = self.cache.force_refresh(&*self.source).await?;
        let cfg = self.current_config();
        let report = compute_index(&snapshot, &cfg, chrono::Utc::now().date_naive());
        self.record(&report);
        Ok(report)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/index", get(get_index))
        .route("/indicators", get(get_indicators))
        .route("/debug/scores", get(debug_scores))
        .route("/debug/history", get(debug_history))
        .route("/admin/reload-weights", get(admin_reload_weights))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

const SNAPSHOT_CACHE_HEADER: &str = "x-snapshot-cache";

fn upstream_unavailable() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(serde_json::json!({ "error": "upstream data unavailable" })),
    )
        .into_response()
}

#[derive(Serialize)]
struct IndexResponse {
    #[serde(flatten)]
    report: IndexReport,
    cached_at_unix: u64,
}

async fn get_index(State(state): State<AppState>) -> Response {
    match state.report().await {
        Ok((report, _, status, cached_at)) => (
            [(SNAPSHOT_CACHE_HEADER, status.as_str())],
            Json(IndexResponse {
                report,
                cached_at_unix: cached_at,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "GET /index failed");
            upstream_unavailable()
        }
    }
}

/// One dashboard card: current value plus its comparison points.
#[derive(Debug, Serialize, Default)]
struct Card {
    current: Option<f64>,
    previous: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days_90: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_ago: Option<f64>,
    /// Percent change vs the previous value (card arrow).
    #[serde(skip_serializing_if = "Option::is_none")]
    delta_pct: Option<f64>,
}

impl Card {
    fn pair(current: Option<f64>, previous: Option<f64>) -> Self {
        Self {
            current,
            previous,
            delta_pct: derive::pct_delta(current, previous),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct FxCards {
    official: Option<f64>,
    blue: Option<f64>,
    breach_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
struct FundCards {
    money_market_aum: f64,
    money_market_30d_pct: f64,
    money_market_ytd_pct: f64,
    equity_aum: f64,
    equity_30d_pct: f64,
    equity_ytd_pct: f64,
}

#[derive(Debug, Serialize)]
struct IndicatorsResponse {
    country_risk: Card,
    monthly_inflation: Card,
    yoy_inflation: Card,
    deposit_rate_30d: Card,
    average_tna_pct: f64,
    fx: FxCards,
    funds: FundCards,
}

fn build_cards(snapshot: &EconomicSnapshot) -> IndicatorsResponse {
    let deposit = derive::thirty_day_deposit_rates(&snapshot.deposit_rate_series, false);
    let breach_pct = match (snapshot.blue_fx, snapshot.official_fx) {
        (Some(blue), Some(official)) if official != 0.0 => {
            Some(derive::currency_breach_pct(blue, official))
        }
        _ => None,
    };

    IndicatorsResponse {
        country_risk: Card {
            current: snapshot.country_risk,
            previous: snapshot.country_risk_previous,
            days_90: snapshot.country_risk_90d,
            year_ago: snapshot.country_risk_year_ago,
            delta_pct: derive::pct_delta(snapshot.country_risk, snapshot.country_risk_previous),
        },
        monthly_inflation: Card::pair(
            snapshot.monthly_inflation,
            snapshot.monthly_inflation_previous,
        ),
        yoy_inflation: Card {
            current: snapshot.yoy_inflation,
            previous: snapshot.yoy_inflation_previous,
            days_90: snapshot.yoy_inflation_90d,
            year_ago: snapshot.yoy_inflation_year_ago,
            delta_pct: derive::pct_delta(snapshot.yoy_inflation, snapshot.yoy_inflation_previous),
        },
        deposit_rate_30d: Card::pair(Some(deposit.current), Some(deposit.previous)),
        average_tna_pct: derive::average_tna(&snapshot.fixed_term_offers) * 100.0,
        fx: FxCards {
            official: snapshot.official_fx,
            blue: snapshot.blue_fx,
            breach_pct,
        },
        funds: FundCards {
            money_market_aum: derive::total_aum(&snapshot.money_market_funds),
            money_market_30d_pct: derive::performance(&snapshot.money_market_funds, 30),
            money_market_ytd_pct: derive::performance(&snapshot.money_market_funds, 365),
            equity_aum: derive::total_aum(&snapshot.equity_funds),
            equity_30d_pct: derive::performance(&snapshot.equity_funds, 30),
            equity_ytd_pct: derive::performance(&snapshot.equity_funds, 365),
        },
    }
}

async fn get_indicators(State(state): State<AppState>) -> Response {
    match state.report().await {
        Ok((_, snapshot, status, _)) => (
            [(SNAPSHOT_CACHE_HEADER, status.as_str())],
            Json(build_cards(&snapshot)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "GET /indicators failed");
            upstream_unavailable()
        }
    }
}

#[derive(Serialize)]
struct ScoresDebug {
    revision: String,
    index: f64,
    interpretation: String,
    inputs: std::collections::BTreeMap<String, f64>,
    scores: std::collections::BTreeMap<String, f64>,
    weights: std::collections::BTreeMap<String, f64>,
}

async fn debug_scores(State(state): State<AppState>) -> Response {
    match state.report().await {
        Ok((report, _, _, _)) => {
            let weights = state
                .current_config()
                .entries
                .iter()
                .map(|(k, e)| (k.clone(), e.weight))
                .collect();
            Json(ScoresDebug {
                revision: report.revision,
                index: report.index,
                interpretation: report.interpretation,
                inputs: report.inputs,
                scores: report.scores,
                weights,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = ?e, "GET /debug/scores failed");
            upstream_unavailable()
        }
    }
}

#[derive(Deserialize)]
struct HistoryParams {
    n: Option<usize>,
}

async fn debug_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(params.n.unwrap_or(10)))
}

async fn admin_reload_weights(State(state): State<AppState>) -> String {
    let fresh = IndexConfig::load_default();
    let revision = fresh.revision.clone();
    match state.weights.write() {
        Ok(mut w) => {
            *w = fresh;
            format!("reloaded: revision={revision}")
        }
        Err(_) => "failed: lock poisoned".to_string(),
    }
}
