//! ArgentinaDatos provider (`api.argentinadatos.com/v1/finanzas/...`).
//!
//! Supplies country risk (latest + history), monthly and year-over-year
//! inflation series, the 30-day deposit rate series, per-bank fixed-term
//! offers, and FCI fund records. Each endpoint degrades independently:
//! a failed or malformed response leaves its slice of the result empty.

use anyhow::{Context, Result};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::snapshot::{FixedTermOffer, FundRecord, SeriesPoint};

const DEFAULT_BASE_URL: &str = "https://api.argentinadatos.com/v1/finanzas";

/// Everything this provider contributes to a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ArgentinaDatosData {
    pub country_risk_history: Vec<SeriesPoint>,
    pub monthly_inflation: Vec<SeriesPoint>,
    pub yoy_inflation: Vec<SeriesPoint>,
    pub deposit_rates: Vec<SeriesPoint>,
    pub fixed_term_offers: Vec<FixedTermOffer>,
    pub money_market_funds: Vec<FundRecord>,
    pub equity_funds: Vec<FundRecord>,
}

pub struct ArgentinaDatosProvider {
    mode: Mode,
}

enum Mode {
    Http {
        base_url: String,
        client: reqwest::Client,
    },
    /// Raw JSON bodies per endpoint, for tests and offline runs.
    Fixture(Box<Fixtures>),
}

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub country_risk_history: String,
    pub monthly_inflation: String,
    pub yoy_inflation: String,
    pub deposit_rates: String,
    pub fixed_term: String,
    pub money_market: String,
    pub equity: String,
}

// --- Wire shapes ---

#[derive(Debug, Deserialize)]
struct DatedValue {
    fecha: String,
    valor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FixedTermWire {
    entidad: String,
    #[serde(rename = "tnaClientes")]
    tna_clientes: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FundWire {
    fondo: String,
    fecha: Option<String>,
    vcp: Option<f64>,
    patrimonio: Option<f64>,
    horizonte: Option<String>,
}

impl ArgentinaDatosProvider {
    pub fn from_env() -> Self {
        let base_url = std::env::var("ARGENTINA_DATOS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            mode: Mode::Http {
                base_url,
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        Self {
            mode: Mode::Fixture(Box::new(fixtures)),
        }
    }

    pub fn name(&self) -> &'static str {
        "argentina_datos"
    }

    /// Fetch all endpoints, concurrently in HTTP mode. Endpoint failures
    /// are logged and counted; the returned struct is always usable.
    pub async fn fetch(&self) -> Result<ArgentinaDatosData> {
        match &self.mode {
            Mode::Fixture(f) => Ok(Self::parse_all(
                &f.country_risk_history,
                &f.monthly_inflation,
                &f.yoy_inflation,
                &f.deposit_rates,
                &f.fixed_term,
                &f.money_market,
                &f.equity,
            )),
            Mode::Http { base_url, client } => {
                let get = |path: &str| {
                    let url = format!("{base_url}/{path}");
                    let client = client.clone();
                    async move {
                        counter!("fetch_requests_total", "provider" => "argentina_datos")
                            .increment(1);
                        let res: Result<String> = async {
                            let resp = client
                                .get(&url)
                                .send()
                                .await
                                .with_context(|| format!("GET {url}"))?
                                .error_for_status()
                                .with_context(|| format!("status for {url}"))?;
                            Ok(resp.text().await.context("reading body")?)
                        }
                        .await;
                        match res {
                            Ok(body) => body,
                            Err(e) => {
                                tracing::warn!(error = ?e, url = %url, "argentina_datos endpoint failed");
                                counter!("fetch_errors_total", "provider" => "argentina_datos")
                                    .increment(1);
                                String::new()
                            }
                        }
                    }
                };

                let (risk, monthly, yoy, deposits, fixed_term, mm, equity) = tokio::join!(
                    get("indices/riesgo-pais"),
                    get("indices/inflacion"),
                    get("indices/inflacionInteranual"),
                    get("tasas/depositos30Dias"),
                    get("tasas/plazoFijo"),
                    get("fci/mercadoDinero/ultimo"),
                    get("fci/rentaVariable/ultimo"),
                );

                Ok(Self::parse_all(
                    &risk,
                    &monthly,
                    &yoy,
                    &deposits,
                    &fixed_term,
                    &mm,
                    &equity,
                ))
            }
        }
    }

    fn parse_all(
        risk: &str,
        monthly: &str,
        yoy: &str,
        deposits: &str,
        fixed_term: &str,
        money_market: &str,
        equity: &str,
    ) -> ArgentinaDatosData {
        let t0 = std::time::Instant::now();
        let data = ArgentinaDatosData {
            country_risk_history: parse_series(risk),
            monthly_inflation: parse_series(monthly),
            yoy_inflation: parse_series(yoy),
            deposit_rates: parse_series(deposits),
            fixed_term_offers: parse_fixed_term(fixed_term),
            money_market_funds: parse_funds(money_market),
            equity_funds: parse_funds(equity),
        };
        histogram!("fetch_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        data
    }
}

/// Parse a `[{fecha, valor}]` array into a dated series. Entries with an
/// unparsable date or a null value are skipped.
pub fn parse_series(body: &str) -> Vec<SeriesPoint> {
    let wire: Vec<DatedValue> = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    wire.into_iter()
        .filter_map(|d| {
            let date = d.fecha.parse().ok()?;
            Some(SeriesPoint::new(date, d.valor?))
        })
        .collect()
}

/// Parse the per-bank fixed-term list (`tnaClientes` may be null).
pub fn parse_fixed_term(body: &str) -> Vec<FixedTermOffer> {
    let wire: Vec<FixedTermWire> = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    wire.into_iter()
        .map(|w| FixedTermOffer {
            bank: w.entidad,
            tna: w.tna_clientes,
        })
        .collect()
}

/// Parse FCI fund records.
pub fn parse_funds(body: &str) -> Vec<FundRecord> {
    let wire: Vec<FundWire> = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    wire.into_iter()
        .map(|w| FundRecord {
            fund: w.fondo,
            date: w.fecha.and_then(|f| f.parse().ok()),
            unit_value: w.vcp,
            aum: w.patrimonio,
            horizon: w.horizonte,
        })
        .collect()
}
