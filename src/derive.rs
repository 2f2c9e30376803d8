//! # Derived Metrics
//! Pure helpers that turn raw upstream time series into the scalar
//! inputs the normalizer consumes and the dashboard cards display.
//!
//! Policy: every helper fails soft. Fewer than two data points, a zero
//! denominator, or a missed date threshold all degrade to a zero-valued
//! result; a sparse upstream must skew the index, never crash it.

use chrono::{Days, NaiveDate};

use crate::snapshot::{FixedTermOffer, FundRecord, SeriesPoint};

/// Days compounded when converting an annual nominal rate to a 30-day
/// effective rate.
const COMPOUND_DAYS: f64 = 30.0 / 365.0;

/// Current/previous 30-day deposit rate, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepositRatePair {
    pub current: f64,
    pub previous: f64,
}

/// Take the two most recent points of a deposit-rate series and convert
/// them to percentages. With `compound_from_annual`, each raw value is a
/// nominal annual rate (TNA) first compounded down to a 30-day effective
/// rate via `((1 + v)^(30/365) - 1) * 100`; otherwise the series is
/// already periodic and only multiplied by 100.
pub fn thirty_day_deposit_rates(
    series: &[SeriesPoint],
    compound_from_annual: bool,
) -> DepositRatePair {
    let mut sorted: Vec<&SeriesPoint> = series.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    if sorted.len() < 2 {
        return DepositRatePair::default();
    }

    let to_pct = |v: f64| {
        if compound_from_annual {
            ((1.0 + v).powf(COMPOUND_DAYS) - 1.0) * 100.0
        } else {
            v * 100.0
        }
    };

    DepositRatePair {
        current: to_pct(sorted[0].value),
        previous: to_pct(sorted[1].value),
    }
}

/// Percentage gap between the blue and official FX rates.
/// `official == 0` yields 0.0 (upstream official quotes are assumed
/// positive; the guard keeps Infinity out of the index).
pub fn currency_breach_pct(blue: f64, official: f64) -> f64 {
    if official == 0.0 {
        return 0.0;
    }
    (blue - official) / official * 100.0
}

/// Percent change of a fund series over the last `days` days.
///
/// Records are sorted descending by date; "current" is the most recent
/// unit value, "previous" the first record dated at or before
/// `current_date - days`. Missing data or no qualifying record → 0.0.
pub fn performance(records: &[FundRecord], days: u64) -> f64 {
    let mut sorted: Vec<(&NaiveDate, f64)> = records
        .iter()
        .filter_map(|r| match (r.date.as_ref(), r.unit_value) {
            (Some(d), Some(v)) => Some((d, v)),
            _ => None,
        })
        .collect();
    sorted.sort_by(|a, b| b.0.cmp(a.0));

    if sorted.len() < 2 {
        return 0.0;
    }

    let (current_date, current) = sorted[0];
    let Some(target) = current_date.checked_sub_days(Days::new(days)) else {
        return 0.0;
    };

    let Some(&(_, previous)) = sorted.iter().find(|(d, _)| **d <= target) else {
        return 0.0;
    };
    if previous == 0.0 {
        return 0.0;
    }

    (current - previous) / previous * 100.0
}

/// Raw series value at or before `latest - days` (90-day and
/// year-over-year comparison cards). `None` when the series is too short.
pub fn value_days_ago(series: &[SeriesPoint], days: u64) -> Option<f64> {
    let mut sorted: Vec<&SeriesPoint> = series.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let latest = sorted.first()?;
    let target = latest.date.checked_sub_days(Days::new(days))?;
    sorted.iter().find(|p| p.date <= target).map(|p| p.value)
}

/// Percent delta between current and previous (card arrows).
/// `previous == 0` or missing inputs → `None`: no arrow, not a fake 0%.
pub fn pct_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p * 100.0),
        _ => None,
    }
}

/// Average TNA across per-bank fixed-term offers, skipping banks that
/// publish no rate. Empty input → 0.0.
pub fn average_tna(offers: &[FixedTermOffer]) -> f64 {
    let rates: Vec<f64> = offers.iter().filter_map(|o| o.tna).collect();
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().sum::<f64>() / rates.len() as f64
}

/// Total assets under management across fund records (missing AUM → 0).
pub fn total_aum(funds: &[FundRecord]) -> f64 {
    funds.iter().map(|f| f.aum.unwrap_or(0.0)).sum()
}

/// Average unit value of funds matching `horizon`. No matches → 0.0.
pub fn average_unit_value(funds: &[FundRecord], horizon: &str) -> f64 {
    let values: Vec<f64> = funds
        .iter()
        .filter(|f| f.horizon.as_deref() == Some(horizon))
        .filter_map(|f| f.unit_value)
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
