//! # Economic Snapshot
//! The read-only view of upstream data the index is computed from.
//!
//! A snapshot is assembled by the fetch layer on each refresh cycle; the
//! core never mutates it. Every field is nullable: an indicator that an
//! upstream source failed to deliver is simply `None` and later resolved
//! through the explicit null→0 policy (`resolve_or_default`).

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation of a dated scalar series ("YYYY-MM-DD" upstream).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A per-bank fixed-term deposit offer (TNA may be missing for some banks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedTermOffer {
    pub bank: String,
    /// Nominal annual rate as a fraction, e.g. `0.35` for 35% TNA.
    pub tna: Option<f64>,
}

/// One FCI fund record (money market or equity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub fund: String,
    pub date: Option<NaiveDate>,
    /// Unit share value ("vcp").
    pub unit_value: Option<f64>,
    /// Assets under management ("patrimonio").
    pub aum: Option<f64>,
    /// Investment horizon hint ("corto" / "largo").
    pub horizon: Option<String>,
}

/// IMF DataMapper series for one country: indicator code → year → value.
pub type ImfSeries = HashMap<String, BTreeMap<i32, f64>>;

/// Everything the aggregator and the dashboard cards need, in one struct.
///
/// Comparison variants (`*_previous`, `*_90d`, `*_year_ago`) are resolved
/// by the fetch layer from upstream history arrays; they feed the card
/// deltas only and never the index itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomicSnapshot {
    // Country risk (points).
    pub country_risk: Option<f64>,
    pub country_risk_previous: Option<f64>,
    pub country_risk_90d: Option<f64>,
    pub country_risk_year_ago: Option<f64>,

    // Inflation (percent).
    pub monthly_inflation: Option<f64>,
    pub monthly_inflation_previous: Option<f64>,
    pub yoy_inflation: Option<f64>,
    pub yoy_inflation_previous: Option<f64>,
    pub yoy_inflation_90d: Option<f64>,
    pub yoy_inflation_year_ago: Option<f64>,

    // FX (ARS per USD).
    pub official_fx: Option<f64>,
    pub official_fx_previous: Option<f64>,
    pub blue_fx: Option<f64>,
    pub blue_fx_previous: Option<f64>,

    /// Raw 30-day fixed-term deposit rate series (fractional TNA by date).
    pub deposit_rate_series: Vec<SeriesPoint>,
    /// Per-bank fixed-term offers behind the latest series point.
    pub fixed_term_offers: Vec<FixedTermOffer>,

    // FCI funds.
    pub money_market_funds: Vec<FundRecord>,
    pub equity_funds: Vec<FundRecord>,

    /// External macro indicators (IMF): code → year → value.
    pub imf: ImfSeries,
}

/// The explicit null→0 policy from the index contract: an indicator that
/// is temporarily unavailable contributes its worst normalized score
/// instead of being excluded, biasing the index toward its zero-value
/// extreme until data returns.
pub fn resolve_or_default(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Latest IMF value for `code` at or before `year`.
pub fn imf_value_for(imf: &ImfSeries, code: &str, year: i32) -> Option<f64> {
    imf.get(code)
        .and_then(|by_year| by_year.range(..=year).next_back())
        .map(|(_, &v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_or_default_maps_none_to_zero() {
        assert_eq!(resolve_or_default(None), 0.0);
        assert_eq!(resolve_or_default(Some(3.25)), 3.25);
    }

    #[test]
    fn imf_lookup_takes_latest_at_or_before_year() {
        let mut imf = ImfSeries::new();
        imf.insert(
            "NGDP_RPCH".to_string(),
            BTreeMap::from([(2022, -1.6), (2024, 5.0), (2026, 4.5)]),
        );
        assert_eq!(imf_value_for(&imf, "NGDP_RPCH", 2025), Some(5.0));
        assert_eq!(imf_value_for(&imf, "NGDP_RPCH", 2026), Some(4.5));
        assert_eq!(imf_value_for(&imf, "NGDP_RPCH", 2021), None);
        assert_eq!(imf_value_for(&imf, "GGXWDG_NGDP", 2025), None);
    }
}
