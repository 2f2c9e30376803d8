//! DolarApi provider (`dolarapi.com/v1/dolares/{oficial,blue}`).
//!
//! Supplies the official and blue FX quotes. The sell price ("venta") is
//! the rate the cards and the breach computation use.

use anyhow::{Context, Result};
use metrics::counter;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://dolarapi.com/v1/dolares";

#[derive(Debug, Clone, Copy, Default)]
pub struct FxQuotes {
    pub official: Option<f64>,
    pub blue: Option<f64>,
}

pub struct DolarApiProvider {
    mode: Mode,
}

enum Mode {
    Http {
        base_url: String,
        client: reqwest::Client,
    },
    Fixture {
        official: String,
        blue: String,
    },
}

#[derive(Debug, Deserialize)]
struct QuoteWire {
    venta: Option<f64>,
}

impl DolarApiProvider {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("DOLAR_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            mode: Mode::Http {
                base_url,
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_fixtures(official: impl Into<String>, blue: impl Into<String>) -> Self {
        Self {
            mode: Mode::Fixture {
                official: official.into(),
                blue: blue.into(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        "dolar_api"
    }

    pub async fn fetch(&self) -> Result<FxQuotes> {
        match &self.mode {
            Mode::Fixture { official, blue } => Ok(FxQuotes {
                official: parse_quote(official),
                blue: parse_quote(blue),
            }),
            Mode::Http { base_url, client } => {
                let get = |casa: &'static str| {
                    let url = format!("{base_url}/{casa}");
                    let client = client.clone();
                    async move {
                        counter!("fetch_requests_total", "provider" => "dolar_api").increment(1);
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
                            Ok(body) => parse_quote(&body),
                            Err(e) => {
                                tracing::warn!(error = ?e, casa, "dolar_api quote failed");
                                counter!("fetch_errors_total", "provider" => "dolar_api")
                                    .increment(1);
                                None
                            }
                        }
                    }
                };

                let (official, blue) = tokio::join!(get("oficial"), get("blue"));
                Ok(FxQuotes { official, blue })
            }
        }
    }
}

/// Extract the sell price from one quote body.
pub fn parse_quote(body: &str) -> Option<f64> {
    let wire: QuoteWire = serde_json::from_str(body).ok()?;
    wire.venta
}
