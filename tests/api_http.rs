// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /index          (JSON contract + cache header)
// - GET /indicators     (card payload derived from fixtures)
// - GET /debug/scores
// - GET /debug/history
// - GET /admin/reload-weights

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use ezeiza_index::api::{self, AppState};
use ezeiza_index::fetch::providers::argentina_datos::{ArgentinaDatosProvider, Fixtures};
use ezeiza_index::fetch::providers::dolar_api::DolarApiProvider;
use ezeiza_index::fetch::providers::imf::ImfProvider;
use ezeiza_index::fetch::LiveSource;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// All providers in fixture mode, so no socket is ever opened.
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

fn test_router() -> Router {
    api::router(AppState::new(Arc::new(fixture_source())))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_index_returns_contract_fields_and_cache_header() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/index")
        .body(Body::empty())
        .expect("build GET /index");
    let resp = app.oneshot(req).await.expect("oneshot /index");
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()
            .get("x-snapshot-cache")
            .expect("cache header must be present")
            .to_str()
            .unwrap(),
        "MISS",
        "first request must be a cache miss"
    );

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse index json");

    let index = v["index"].as_f64().expect("missing 'index'");
    assert!((0.0..=100.0).contains(&index));
    let label = v["interpretation"].as_str().expect("missing label");
    assert_ne!(label, "Invalid Index Value");
    assert!(v.get("revision").is_some(), "missing 'revision'");
    assert!(v.get("cached_at_unix").is_some(), "missing 'cached_at_unix'");

    let scores = v["scores"].as_object().expect("missing 'scores'");
    assert_eq!(scores.len(), 7, "one score per configured indicator");
    for (key, score) in scores {
        let s = score.as_f64().expect("score must be a number");
        assert!((0.0..=100.0).contains(&s), "{key} score out of range: {s}");
    }
}

#[tokio::test]
async fn api_indicators_builds_cards_from_fixtures() {
    let app = test_router();
    let (status, v) = get_json(&app, "/indicators").await;
    assert_eq!(status, StatusCode::OK);

    // Country risk comparisons resolved from the history array.
    assert_eq!(v["country_risk"]["current"], 725.0);
    assert_eq!(v["country_risk"]["previous"], 740.0);
    assert_eq!(v["country_risk"]["days_90"], 650.0);
    assert_eq!(v["country_risk"]["year_ago"], 1520.0);

    // Deposit rate pair, value × 100.
    assert_eq!(v["deposit_rate_30d"]["current"], 6.0);
    assert_eq!(v["deposit_rate_30d"]["previous"], 5.0);
    let delta = v["deposit_rate_30d"]["delta_pct"].as_f64().unwrap();
    assert!((delta - 20.0).abs() < 1e-9, "6 vs 5 is +20%");

    // Average TNA over publishing banks: (0.34 + 0.30) / 2 → 32%.
    let tna = v["average_tna_pct"].as_f64().unwrap();
    assert!((tna - 32.0).abs() < 1e-9);

    // FX cards + breach.
    assert_eq!(v["fx"]["official"], 1000.0);
    assert_eq!(v["fx"]["blue"], 1200.0);
    let breach = v["fx"]["breach_pct"].as_f64().unwrap();
    assert!((breach - 20.0).abs() < 1e-9);

    // Fund performance.
    let mm30 = v["funds"]["money_market_30d_pct"].as_f64().unwrap();
    assert!((mm30 - 5.0).abs() < 1e-9, "21000 vs 20000 → +5%");
    let eq30 = v["funds"]["equity_30d_pct"].as_f64().unwrap();
    assert!((eq30 - 10.0).abs() < 1e-9, "2.75M vs 2.5M → +10%");
    // No record a full year back → soft zero.
    assert_eq!(v["funds"]["money_market_ytd_pct"], 0.0);
}

#[tokio::test]
async fn api_debug_scores_exposes_inputs_scores_and_weights() {
    let app = test_router();
    let (status, v) = get_json(&app, "/debug/scores").await;
    assert_eq!(status, StatusCode::OK);

    assert!(v["index"].is_number());
    let inputs = v["inputs"].as_object().expect("inputs");
    let scores = v["scores"].as_object().expect("scores");
    let weights = v["weights"].as_object().expect("weights");
    assert_eq!(inputs.len(), scores.len());
    assert_eq!(scores.len(), weights.len());

    let sum: f64 = weights.values().filter_map(|w| w.as_f64()).sum();
    assert!((sum - 1.0).abs() < 1e-6, "weights must sum to 1.0");

    // Country risk raw 725 → inverted over [0, 2500] → 71.
    let cr = scores["country_risk"].as_f64().unwrap();
    assert!((cr - 71.0).abs() < 1e-9, "got {cr}");
}

#[tokio::test]
async fn api_debug_history_records_computed_indexes() {
    let app = test_router();

    let (_, before) = get_json(&app, "/debug/history").await;
    assert_eq!(before.as_array().map(|a| a.len()), Some(0));

    let _ = get_json(&app, "/index").await;
    let _ = get_json(&app, "/index").await;

    let (_, after) = get_json(&app, "/debug/history?n=1").await;
    let rows = after.as_array().expect("history array");
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["index"].is_number());
    assert!(rows[0]["interpretation"].is_string());
}

#[tokio::test]
async fn api_admin_reload_weights_reports_revision() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/admin/reload-weights")
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot reload");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert!(body.starts_with("reloaded:"), "got: {body}");
}
