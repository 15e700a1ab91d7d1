use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use payoff::api::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request builds");
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn analyze_compares_strategies() {
    let payload = json!({
        "extraPayment": 100,
        "asOfDate": "2024-01-01",
        "debts": [
            { "id": "A", "name": "Card A", "balance": 1000, "apr": 20, "minPayment": 50 },
            { "id": "B", "name": "Card B", "balance": 2000, "apr": 10, "minPayment": 60 }
        ]
    });
    let (status, body) = send(app(), post_json("/api/analyze", payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let strategies = &body["strategies"];
    let baseline = strategies["status_quo"]["payoffMonth"].as_u64().expect("converges");
    let snowball = strategies["snowball"]["payoffMonth"].as_u64().expect("converges");
    assert!(snowball < baseline);
    assert!(body["savings"]["interest_saved_avalanche"].as_f64().unwrap_or(0.0) > 0.0);
    assert_eq!(body["debts"].as_array().map(Vec::len), Some(2));
    assert!(strategies["snowball"].get("schedule").is_none());
}

#[tokio::test]
async fn analyze_without_debts_is_a_validation_error() {
    let (status, body) = send(
        app(),
        post_json("/api/analyze", json!({ "extraPayment": -1 }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .expect("details listed")
        .iter()
        .filter_map(|issue| issue["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["extraPayment", "debts"]);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (status, body) = send(app(), post_json("/api/analyze", "{ nope".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn normalize_returns_debts_and_exclusions() {
    let payload = json!({
        "debts": [{ "id": "card", "balance": 500, "apr": 18, "debtType": "credit_card" }],
        "linkedLiabilities": [{ "accountId": "loan", "currentBalance": -20 }]
    });
    let (status, body) = send(app(), post_json("/api/debts/normalize", payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["debts"][0]["minPayment"], json!(25.0));
    assert_eq!(body["excluded"][0]["reason"], "negative_balance");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let request = Request::builder()
        .uri("/api/nope")
        .body(Body::empty())
        .expect("request builds");
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
