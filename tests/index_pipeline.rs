//! End-to-end pipeline test: fixture providers → snapshot assembly →
//! index computation, with exact expected numbers.

use chrono::NaiveDate;

use ezeiza_index::config::{self, IndexConfig};
use ezeiza_index::fetch::providers::argentina_datos::{ArgentinaDatosProvider, Fixtures};
use ezeiza_index::fetch::providers::dolar_api::DolarApiProvider;
use ezeiza_index::fetch::providers::imf::ImfProvider;
use ezeiza_index::fetch::{LiveSource, SnapshotSource};
use ezeiza_index::index::compute_index;

fn fixture_source() -> LiveSource {
    let argentina = ArgentinaDatosProvider::from_fixtures(Fixtures {
        country_risk_history: include_str!("fixtures/riesgo_pais.json").to_string(),
        monthly_inflation: include_str!("fixtures/inflacion.json").to_string(),
        yoy_inflation: include_str!("fixtures/inflacion_interanual.json").to_string(),
        deposit_rates: include_str!("fixtures/depositos30.json").to_string(),
        fixed_term: include_str!("fixtures/plazo_fijo.json").to_string(),
        money_market: include_str!("fixtures/fci_mercado_dinero.json").to_string(),
        equity: include_str!("fixtures/fci_renta_variable.json").to_string(),
    });
    let fx = DolarApiProvider::from_fixtures(
        include_str!("fixtures/dolar_oficial.json"),
        include_str!("fixtures/dolar_blue.json"),
    );
    let imf = ImfProvider::from_fixtures(vec![
        (
            "NGDP_RPCH".to_string(),
            include_str!("fixtures/imf_ngdp_rpch.json").to_string(),
        ),
        (
            "GGXWDG_NGDP".to_string(),
            include_str!("fixtures/imf_ggxwdg_ngdp.json").to_string(),
        ),
    ]);
    LiveSource::new(argentina, fx, imf)
}

#[tokio::test]
async fn fixtures_produce_the_expected_index() {
    let snapshot = fixture_source().fetch().await.expect("fixture fetch");
    let cfg = IndexConfig::default_seed();
    let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();

    let report = compute_index(&snapshot, &cfg, today);

    // Raw inputs resolved from the fixtures.
    assert_eq!(report.inputs[config::COUNTRY_RISK], 725.0);
    assert_eq!(report.inputs[config::YOY_INFLATION], 36.6);
    assert_eq!(report.inputs[config::MONTHLY_INFLATION], 1.6);
    assert!((report.inputs[config::DEPOSIT_RATE_30D] - 0.06).abs() < 1e-12);
    assert!((report.inputs[config::CURRENCY_BREACH] - 0.20).abs() < 1e-12);
    assert_eq!(report.inputs[config::GDP_GROWTH], 5.5);
    assert_eq!(report.inputs[config::GOVERNMENT_DEBT], 79.9);

    // Per-indicator scores.
    assert!((report.scores[config::COUNTRY_RISK] - 71.0).abs() < 1e-9);
    assert!((report.scores[config::YOY_INFLATION] - 90.85).abs() < 1e-9);
    assert!((report.scores[config::CURRENCY_BREACH] - 80.0).abs() < 1e-9);
    assert!((report.scores[config::DEPOSIT_RATE_30D] - 6.0).abs() < 1e-9);
    assert!((report.scores[config::GDP_GROWTH] - 77.5).abs() < 1e-9);

    // Weighted composite:
    //   0.20*71 + 0.20*90.85 + 0.05*(89 + 1/3) + 0.15*6 + 0.20*80
    //   + 0.10*77.5 + 0.10*(46.7 + 1/30) = 66.16
    assert!(
        (report.index - 66.16).abs() < 1e-6,
        "index was {}",
        report.index
    );
    assert_eq!(report.interpretation, "Estamos de perlangas");
}

#[tokio::test]
async fn recomputation_is_deterministic() {
    let source = fixture_source();
    let cfg = IndexConfig::default_seed();
    let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();

    let a = compute_index(&source.fetch().await.unwrap(), &cfg, today);
    let b = compute_index(&source.fetch().await.unwrap(), &cfg, today);
    assert_eq!(a, b);
}

#[tokio::test]
async fn imf_year_lookup_saturates_at_latest_published_year() {
    // A query from beyond the published range takes the newest value
    // instead of going missing.
    let snapshot = fixture_source().fetch().await.unwrap();
    let cfg = IndexConfig::default_seed();
    let later = NaiveDate::from_ymd_opt(2031, 1, 1).unwrap();

    let report = compute_index(&snapshot, &cfg, later);
    assert_eq!(report.inputs[config::GDP_GROWTH], 5.5);
    assert_eq!(report.inputs[config::GOVERNMENT_DEBT], 79.9);
}
