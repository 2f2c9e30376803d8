//! # Index Engine
//! Pure, testable logic that maps an `EconomicSnapshot` + `IndexConfig`
//! → the 0–100 sentiment index. No I/O, suitable for unit tests and
//! offline evaluation.
//!
//! Policy: every configured indicator contributes `score * weight`; a
//! missing value resolves to 0 before normalization (worst score for
//! non-inverted indicators, best for inverted ones) rather than being
//! excluded. The index always exists, even over sparse data.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{self, IndexConfig};
use crate::derive;
use crate::normalize::{normalize, normalize_inverted};
use crate::snapshot::{imf_value_for, resolve_or_default, EconomicSnapshot};

/// IMF DataMapper codes consumed by the index.
pub const IMF_GDP_GROWTH: &str = "NGDP_RPCH";
pub const IMF_GOVERNMENT_DEBT: &str = "GGXWDG_NGDP";

/// Sentinel for out-of-range interpretation input.
pub const INVALID_INDEX_LABEL: &str = "Invalid Index Value";

/// The computed index plus its full per-indicator breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Weighted, clamped composite in [0, 100].
    pub index: f64,
    /// Human label for the index band.
    pub interpretation: String,
    /// Config revision the scores were computed under.
    pub revision: String,
    /// Normalized score per configured indicator, each in [0, 100].
    pub scores: BTreeMap<String, f64>,
    /// Raw values fed into the normalizer (post null→0 resolution).
    pub inputs: BTreeMap<String, f64>,
}

/// Resolve the raw input value for each configured indicator from the
/// snapshot. Derived indicators (deposit rate, breach, IMF lookups) are
/// computed here so the weighting loop below stays a plain fold.
///
/// Deposit rate and breach enter as fractions (their configured range is
/// [0, 1]); the percent forms are card display only.
fn indicator_inputs(
    snapshot: &EconomicSnapshot,
    today: NaiveDate,
) -> BTreeMap<String, Option<f64>> {
    let deposit = derive::thirty_day_deposit_rates(&snapshot.deposit_rate_series, false);
    let deposit_fraction = if snapshot.deposit_rate_series.len() < 2 {
        None
    } else {
        Some(deposit.current / 100.0)
    };

    let breach_fraction = match (snapshot.blue_fx, snapshot.official_fx) {
        (Some(blue), Some(official)) if official != 0.0 => {
            Some(derive::currency_breach_pct(blue, official) / 100.0)
        }
        _ => None,
    };

    let year = today.year();

    BTreeMap::from([
        (config::COUNTRY_RISK.to_string(), snapshot.country_risk),
        (config::YOY_INFLATION.to_string(), snapshot.yoy_inflation),
        (
            config::MONTHLY_INFLATION.to_string(),
            snapshot.monthly_inflation,
        ),
        (config::DEPOSIT_RATE_30D.to_string(), deposit_fraction),
        (config::CURRENCY_BREACH.to_string(), breach_fraction),
        (
            config::GDP_GROWTH.to_string(),
            imf_value_for(&snapshot.imf, IMF_GDP_GROWTH, year),
        ),
        (
            config::GOVERNMENT_DEBT.to_string(),
            imf_value_for(&snapshot.imf, IMF_GOVERNMENT_DEBT, year),
        ),
    ])
}

/// Compute the composite index: normalize each configured indicator with
/// its range/polarity, weight, sum, clamp to [0, 100].
///
/// Deterministic: the same snapshot, config, and date always produce the
/// same report. `today` pins the IMF "current year" lookup so the caller
/// owns the only time-dependent input.
pub fn compute_index(
    snapshot: &EconomicSnapshot,
    cfg: &IndexConfig,
    today: NaiveDate,
) -> IndexReport {
    let raw_inputs = indicator_inputs(snapshot, today);

    let mut scores = BTreeMap::new();
    let mut inputs = BTreeMap::new();
    let mut index = 0.0;

    for (key, entry) in &cfg.entries {
        let raw = resolve_or_default(raw_inputs.get(key).copied().flatten());
        let score = if entry.invert {
            normalize_inverted(raw, entry.min, entry.max)
        } else {
            normalize(raw, entry.min, entry.max)
        };
        index += score * entry.weight;
        inputs.insert(key.clone(), raw);
        scores.insert(key.clone(), score);
    }

    let index = index.clamp(0.0, 100.0);

    IndexReport {
        index,
        interpretation: interpret_index(index).to_string(),
        revision: cfg.revision.clone(),
        scores,
        inputs,
    }
}

/// Map a (pre-clamped) index onto its band label. Out-of-range input
/// returns the explicit sentinel instead of clamping; this is a
/// boundary check, the caller is expected to have clamped already.
pub fn interpret_index(index: f64) -> &'static str {
    if !(0.0..=100.0).contains(&index) {
        INVALID_INDEX_LABEL
    } else if index < 20.0 {
        "La salida es Ezeiza"
    } else if index < 40.0 {
        "Tal vez me quede"
    } else if index < 60.0 {
        "Aguantamos"
    } else if index < 80.0 {
        "Estamos de perlangas"
    } else {
        "La entrada es Ezeiza"
    }
}
