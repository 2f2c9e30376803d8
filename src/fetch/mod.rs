//! # Fetch Layer
//! Assembles `EconomicSnapshot`s from the upstream providers.
//!
//! Providers fail independently: a dead upstream leaves its fields
//! `None`/empty and the aggregation still produces an index. The HTTP
//! handlers sit behind a TTL cache ([`cache`]) and a background refresh
//! task ([`scheduler`]) so upstream latency never blocks rendering.

pub mod cache;
pub mod providers;
pub mod scheduler;

use anyhow::Result;
use async_trait::async_trait;
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

use crate::derive::value_days_ago;
use crate::snapshot::{EconomicSnapshot, SeriesPoint};
use providers::argentina_datos::{ArgentinaDatosData, ArgentinaDatosProvider};
use providers::dolar_api::{DolarApiProvider, FxQuotes};
use providers::imf::ImfProvider;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("fetch_requests_total", "Upstream HTTP requests issued.");
        describe_counter!("fetch_errors_total", "Upstream requests that failed.");
        describe_histogram!("fetch_parse_ms", "Provider parse time in milliseconds.");
        describe_gauge!(
            "snapshot_last_refresh_ts",
            "Unix ts of the last successful snapshot refresh."
        );
        describe_gauge!("sentiment_index_value", "Last computed sentiment index.");
    });
}

/// Anything that can produce a full economic snapshot.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<EconomicSnapshot>;
    fn name(&self) -> &'static str;
}

/// The production source: ArgentinaDatos + DolarApi + IMF, fetched
/// concurrently and merged.
pub struct LiveSource {
    argentina: ArgentinaDatosProvider,
    fx: DolarApiProvider,
    imf: ImfProvider,
}

impl LiveSource {
    pub fn from_env() -> Self {
        Self {
            argentina: ArgentinaDatosProvider::from_env(),
            fx: DolarApiProvider::from_env(),
            imf: ImfProvider::from_env(),
        }
    }

    pub fn new(argentina: ArgentinaDatosProvider, fx: DolarApiProvider, imf: ImfProvider) -> Self {
        Self {
            argentina,
            fx,
            imf,
        }
    }
}

#[async_trait]
impl SnapshotSource for LiveSource {
    async fn fetch(&self) -> Result<EconomicSnapshot> {
        ensure_metrics_described();

        let (argentina, fx, imf) =
            tokio::join!(self.argentina.fetch(), self.fx.fetch(), self.imf.fetch());

        let argentina = argentina.unwrap_or_else(|e| {
            tracing::warn!(error = ?e, provider = self.argentina.name(), "provider error");
            ArgentinaDatosData::default()
        });
        let fx = fx.unwrap_or_else(|e| {
            tracing::warn!(error = ?e, provider = self.fx.name(), "provider error");
            FxQuotes::default()
        });
        let imf = imf.unwrap_or_else(|e| {
            tracing::warn!(error = ?e, provider = self.imf.name(), "provider error");
            Default::default()
        });

        Ok(assemble(argentina, fx, imf))
    }

    fn name(&self) -> &'static str {
        "live"
    }
}

/// Most recent and second most recent values of a dated series.
fn latest_two(series: &[SeriesPoint]) -> (Option<f64>, Option<f64>) {
    let mut sorted: Vec<&SeriesPoint> = series.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    (
        sorted.first().map(|p| p.value),
        sorted.get(1).map(|p| p.value),
    )
}

/// Merge provider outputs into a snapshot, resolving the comparison
/// variants (previous / 90-day / year-ago) from the history arrays.
pub fn assemble(
    argentina: ArgentinaDatosData,
    fx: FxQuotes,
    imf: crate::snapshot::ImfSeries,
) -> EconomicSnapshot {
    let (country_risk, country_risk_previous) = latest_two(&argentina.country_risk_history);
    let (monthly_inflation, monthly_inflation_previous) = latest_two(&argentina.monthly_inflation);
    let (yoy_inflation, yoy_inflation_previous) = latest_two(&argentina.yoy_inflation);

    EconomicSnapshot {
        country_risk,
        country_risk_previous,
        country_risk_90d: value_days_ago(&argentina.country_risk_history, 90),
        country_risk_year_ago: value_days_ago(&argentina.country_risk_history, 365),

        monthly_inflation,
        monthly_inflation_previous,
        yoy_inflation,
        yoy_inflation_previous,
        yoy_inflation_90d: value_days_ago(&argentina.yoy_inflation, 90),
        yoy_inflation_year_ago: value_days_ago(&argentina.yoy_inflation, 365),

        official_fx: fx.official,
        official_fx_previous: None,
        blue_fx: fx.blue,
        blue_fx_previous: None,

        deposit_rate_series: argentina.deposit_rates,
        fixed_term_offers: argentina.fixed_term_offers,
        money_market_funds: argentina.money_market_funds,
        equity_funds: argentina.equity_funds,
        imf,
    }
}
