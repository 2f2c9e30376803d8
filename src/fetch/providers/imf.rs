//! IMF DataMapper provider
//! (`www.imf.org/external/datamapper/api/v1/{code}/ARG`).
//!
//! Fetches the annual macro series for Argentina: GDP growth, consumer
//! price inflation, unemployment, government debt and the rest of the
//! dashboard's external indicators. Only `NGDP_RPCH` and `GGXWDG_NGDP`
//! feed the index; the others back the cards.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use metrics::counter;
use serde::Deserialize;

use crate::snapshot::ImfSeries;

const DEFAULT_BASE_URL: &str = "https://www.imf.org/external/datamapper/api/v1";

/// Indicator codes fetched for Argentina.
pub const CODES: &[&str] = &[
    "NGDP_RPCH",    // Real GDP growth
    "PCPIPCH",      // Inflation, average consumer prices
    "LUR",          // Unemployment rate
    "BCA_NGDPD",    // Current account balance (% of GDP)
    "GGXWDG_NGDP",  // General government gross debt (% of GDP)
    "GGXCNL_NGDP",  // General government net lending/borrowing (% of GDP)
    "NGDPDPC",      // GDP per capita, current prices
    "NID_NGDP",     // Total investment (% of GDP)
    "NGSD_NGDP",    // Gross national savings (% of GDP)
    "PPPEX",        // Implied PPP conversion rate
];

pub struct ImfProvider {
    mode: Mode,
}

enum Mode {
    Http {
        base_url: String,
        client: reqwest::Client,
    },
    /// One raw response body per indicator code.
    Fixture(Vec<(String, String)>),
}

#[derive(Debug, Deserialize)]
struct ImfResponse {
    #[serde(default)]
    values: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
}

impl ImfProvider {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("IMF_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            mode: Mode::Http {
                base_url,
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixtures(fixtures: Vec<(String, String)>) -> Self {
        Self {
            mode: Mode::Fixture(fixtures),
        }
    }

    pub fn name(&self) -> &'static str {
        "imf"
    }

    pub async fn fetch(&self) -> Result<ImfSeries> {
        match &self.mode {
            Mode::Fixture(bodies) => {
                let mut out = ImfSeries::new();
                for (code, body) in bodies {
                    if let Some(series) = parse_indicator(body, code) {
                        out.insert(code.clone(), series);
                    }
                }
                Ok(out)
            }
            Mode::Http { base_url, client } => {
                let mut out = ImfSeries::new();
                // Sequential on purpose: ten small GETs against a slow
                // origin; the whole fetch is already off the hot path.
                for code in CODES {
                    counter!("fetch_requests_total", "provider" => "imf").increment(1);
                    let url = format!("{base_url}/{code}/ARG");
                    let res: Result<String> = async {
                        let resp = client
                            .get(&url)
                            .send()
                            .await
                            .with_context(|| format!("GET {url}"))?
                            .error_for_status()?;
                        Ok(resp.text().await.context("reading body")?)
                    }
                    .await;
                    match res {
                        Ok(body) => {
                            if let Some(series) = parse_indicator(&body, code) {
                                out.insert(code.to_string(), series);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = ?e, code, "imf indicator failed");
                            counter!("fetch_errors_total", "provider" => "imf").increment(1);
                        }
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Extract the Argentine year→value series for `code` from a DataMapper
/// response (`values.{code}.ARG.{year}`). Unparsable years are skipped.
pub fn parse_indicator(body: &str, code: &str) -> Option<BTreeMap<i32, f64>> {
    let wire: ImfResponse = serde_json::from_str(body).ok()?;
    let by_country = wire.values.get(code)?;
    let arg = by_country.get("ARG")?;
    let series: BTreeMap<i32, f64> = arg
        .iter()
        .filter_map(|(year, &v)| Some((year.parse().ok()?, v)))
        .collect();
    if series.is_empty() {
        None
    } else {
        Some(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "values": {
            "NGDP_RPCH": {
                "ARG": {"2023": -1.6, "2024": -1.7, "2025": 5.5}
            }
        },
        "api": {"version": "1"}
    }"#;

    #[test]
    fn indicator_parses_year_map() {
        let series = parse_indicator(BODY, "NGDP_RPCH").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series[&2025], 5.5);
    }

    #[test]
    fn wrong_code_or_garbage_is_none() {
        assert!(parse_indicator(BODY, "GGXWDG_NGDP").is_none());
        assert!(parse_indicator("not json", "NGDP_RPCH").is_none());
    }

    #[tokio::test]
    async fn fixture_mode_collects_series() {
        let provider =
            ImfProvider::from_fixtures(vec![("NGDP_RPCH".to_string(), BODY.to_string())]);
        let imf = provider.fetch().await.unwrap();
        assert!(imf.contains_key("NGDP_RPCH"));
    }
}
