//! # Index Weights Configuration
//!
//! The weight/range table is an explicit, versioned unit passed into the
//! aggregator, not a pile of free-floating constants. The formula has
//! been revised over time, so the whole table carries a `revision` tag
//! and can be swapped out via a config file without touching code.
//!
//! - Loads from TOML or JSON (`config/index_weights.toml` / `.json`,
//!   overridable via `INDEX_WEIGHTS_PATH`).
//! - Falls back to the built-in `default_seed()` on any read/parse error.
//! - `validate()` enforces `min < max` per entry and a weight sum of 1.0;
//!   an invalid file is rejected in favor of the seed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_WEIGHTS_PATH: &str = "INDEX_WEIGHTS_PATH";

// Canonical indicator keys. Config files and score maps use these names.
pub const COUNTRY_RISK: &str = "country_risk";
pub const YOY_INFLATION: &str = "yoy_inflation";
pub const MONTHLY_INFLATION: &str = "monthly_inflation";
pub const DEPOSIT_RATE_30D: &str = "deposit_rate_30d";
pub const CURRENCY_BREACH: &str = "currency_breach";
pub const GDP_GROWTH: &str = "gdp_growth";
pub const GOVERNMENT_DEBT: &str = "government_debt";

/// How one indicator maps into the index: its weight plus the
/// normalization range and polarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorEntry {
    pub weight: f64,
    pub min: f64,
    pub max: f64,
    /// `true` when a higher raw value is economically worse.
    #[serde(default)]
    pub invert: bool,
}

/// One complete, internally consistent revision of the formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Free-form revision tag, e.g. `"2025-08"`.
    pub revision: String,
    pub entries: BTreeMap<String, IndicatorEntry>,
}

impl IndexConfig {
    /// Load from an explicit path (TOML or JSON by extension, with a
    /// cross-parse fallback). The result is validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading index weights from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let cfg: IndexConfig = if ext == "json" {
            serde_json::from_str(&content).context("parsing index weights json")?
        } else {
            // TOML is the default on-disk format; fall back to JSON so a
            // misnamed file still loads.
            toml::from_str(&content)
                .or_else(|_| serde_json::from_str(&content))
                .context("parsing index weights toml")?
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolution order: `$INDEX_WEIGHTS_PATH`, then
    /// `config/index_weights.toml`, then `config/index_weights.json`,
    /// then the built-in seed. Any failure logs a warning and yields the
    /// seed; the service must always have a usable table.
    pub fn load_default() -> Self {
        let candidates: Vec<PathBuf> = std::env::var(ENV_WEIGHTS_PATH)
            .map(|p| vec![PathBuf::from(p)])
            .unwrap_or_else(|_| {
                vec![
                    PathBuf::from("config/index_weights.toml"),
                    PathBuf::from("config/index_weights.json"),
                ]
            });

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), revision = %cfg.revision, "loaded index weights");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = ?e, "invalid index weights file, using seed");
                    return Self::default_seed();
                }
            }
        }
        Self::default_seed()
    }

    /// The canonical revision: 20% country risk, 20% year-over-year
    /// inflation, 5% monthly inflation, 15% 30-day deposit rate, 20%
    /// currency breach, 10% GDP growth, 10% government debt.
    ///
    /// Deposit rate and breach are normalized as fractions over [0, 1];
    /// the percent forms shown on the cards are display-only.
    pub fn default_seed() -> Self {
        let entry = |weight, min, max, invert| IndicatorEntry {
            weight,
            min,
            max,
            invert,
        };
        let entries = BTreeMap::from([
            (COUNTRY_RISK.to_string(), entry(0.20, 0.0, 2500.0, true)),
            (YOY_INFLATION.to_string(), entry(0.20, 0.0, 400.0, true)),
            (MONTHLY_INFLATION.to_string(), entry(0.05, 0.0, 15.0, true)),
            (DEPOSIT_RATE_30D.to_string(), entry(0.15, 0.0, 1.0, false)),
            (CURRENCY_BREACH.to_string(), entry(0.20, 0.0, 1.0, true)),
            (GDP_GROWTH.to_string(), entry(0.10, -10.0, 10.0, false)),
            (GOVERNMENT_DEBT.to_string(), entry(0.10, 0.0, 150.0, true)),
        ]);
        Self {
            revision: "2025-08".to_string(),
            entries,
        }
    }

    /// Reject tables that would produce a misleading index: degenerate
    /// normalization ranges or weights not summing to 1.0.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            bail!("index config '{}' has no entries", self.revision);
        }
        for (key, e) in &self.entries {
            if !(e.min < e.max) {
                bail!(
                    "indicator '{key}': min ({}) must be < max ({})",
                    e.min,
                    e.max
                );
            }
            if !(0.0..=1.0).contains(&e.weight) {
                bail!("indicator '{key}': weight {} outside [0, 1]", e.weight);
            }
        }
        let sum: f64 = self.entries.values().map(|e| e.weight).sum();
        if (sum - 1.0).abs() > 1e-6 {
            bail!("weights sum to {sum}, expected 1.0");
        }
        Ok(())
    }
}
