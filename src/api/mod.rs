mod payload;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::core::{Analysis, EngineConfig, analyze};
use crate::error::{ApiError, RequestError};

pub use payload::{
    AnalyzePayload, AnalyzeRequest, NormalizePayload, NormalizeResponse,
    analyze_request_from_json, analyze_request_from_payload, normalize_from_payload,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    pub engine: EngineConfig,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Request(RequestError::MalformedJson(rejection.body_text()))
    }
}

/// Runs the comparator on an already-validated request and attaches the
/// registry's exclusions.
pub fn run_analysis(request: &AnalyzeRequest, engine: &EngineConfig) -> Analysis {
    let mut analysis = analyze(&request.simulation, engine);
    analysis.excluded = request.excluded.clone();
    analysis
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/debts/normalize", post(normalize_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(config: &ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let state = AppState {
        engine: config.engine.engine_config(),
    };
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        horizon_months = state.engine.horizon_months,
        "payoff HTTP API listening"
    );

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let request = analyze_request_from_payload(payload, today())?;
    if !request.excluded.is_empty() {
        tracing::info!(excluded = request.excluded.len(), "analysis proceeding without excluded debts");
    }

    let engine = state.engine;
    let analysis = tokio::task::spawn_blocking(move || run_analysis(&request, &engine))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(json_response(StatusCode::OK, analysis))
}

async fn normalize_handler(
    payload: Result<Json<NormalizePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    Ok(json_response(StatusCode::OK, normalize_from_payload(payload)))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DEFAULT_HORIZON_MONTHS, ExclusionReason};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn run_analysis_attaches_excluded_debts() {
        let json = r#"{
          "extraPayment": 100,
          "debts": [
            { "id": "A", "name": "Card A", "balance": 1000, "apr": 20, "minPayment": 50 },
            { "id": "B", "name": "Card B", "balance": 2000, "apr": 10, "minPayment": 60 },
            { "id": "C", "name": "Broken", "balance": 500, "apr": -3, "minPayment": 25 }
          ]
        }"#;
        let request = analyze_request_from_json(json, as_of()).expect("valid");
        let analysis = run_analysis(&request, &EngineConfig::default());
        assert_eq!(analysis.debts.len(), 2);
        assert_eq!(analysis.excluded.len(), 1);
        assert_eq!(analysis.excluded[0].reason, ExclusionReason::NegativeApr);
        assert_eq!(analysis.horizon_months, DEFAULT_HORIZON_MONTHS);
    }

    #[test]
    fn analysis_serialization_contains_expected_fields() {
        let json = r#"{
          "extraPayment": 100,
          "includeSchedule": true,
          "debts": [
            { "id": "A", "name": "Card A", "balance": 1000, "apr": 20, "minPayment": 50, "debtType": "credit_card" }
          ]
        }"#;
        let request = analyze_request_from_json(json, as_of()).expect("valid");
        let analysis = run_analysis(&request, &EngineConfig::default());
        let json = serde_json::to_string(&analysis).expect("analysis should serialize");

        for key in [
            "\"totalDebt\"",
            "\"totalMinPayment\"",
            "\"strategies\"",
            "\"status_quo\"",
            "\"snowball\"",
            "\"avalanche\"",
            "\"payoffMonth\"",
            "\"payoffDate\"",
            "\"totalInterestPaid\"",
            "\"interest_saved_snowball\"",
            "\"months_saved_avalanche\"",
            "\"soloPayoffMonths\"",
            "\"rank\"",
            "\"minPayment\"",
            "\"debtType\":\"credit_card\"",
            "\"schedule\"",
            "\"excluded\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn non_convergent_plan_serializes_null_payoff() {
        let json = r#"{ "debts": [ { "id": "B", "balance": 1000, "apr": 30, "minPayment": 10 } ] }"#;
        let request = analyze_request_from_json(json, as_of()).expect("valid");
        let analysis = run_analysis(&request, &EngineConfig::default());
        let value = serde_json::to_value(&analysis).expect("serializes");
        let sq = &value["strategies"]["status_quo"];
        assert!(sq["payoffMonth"].is_null());
        assert!(sq["payoffDate"].is_null());
        assert_eq!(sq["converged"], serde_json::Value::Bool(false));
        assert!(sq.get("schedule").is_none());
    }
}
