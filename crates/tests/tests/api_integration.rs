use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use currencypal_api::{build_app, ApiConfig};
use currencypal_rates::RateClientConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn upstream() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/USD"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "rates": { "NGN": 1500, "EUR": 0.92 } })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/NGN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": {
                "USD": 0.00067,
                "EUR": 0.00058,
                "GBP": 0.0005,
                "JPY": 0.1,
                "CAD": 0.00091
            }
        })))
        .mount(&server)
        .await;

    server
}

fn app_for(base_url: String) -> Router {
    app_with_origins(base_url, None)
}

fn app_with_origins(base_url: String, allowed_origins: Option<Vec<String>>) -> Router {
    build_app(ApiConfig {
        rates: RateClientConfig {
            base_url,
            timeout: Duration::from_secs(2),
        },
        allowed_origins,
    })
    .expect("app should build")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_service_and_metrics() {
    let server = upstream().await;
    let (status, body) = send(app_for(server.uri()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "CurrencyPal");
    assert!(body["metrics"]["requests_total"].is_u64());
}

#[tokio::test]
async fn chat_converts_currency() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        post_json("/chat", json!({ "text": "  convert 100 usd to ngn " })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"],
        "✅ $100.00 = ₦150,000.00 💱 (Rate: 1 USD = 1,500 NGN)"
    );
}

#[tokio::test]
async fn chat_without_text_gets_prompt() {
    let server = upstream().await;
    let (status, body) = send(app_for(server.uri()), post_json("/chat", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["response"]
        .as_str()
        .unwrap()
        .starts_with("Please say something!"));
}

#[tokio::test]
async fn convert_endpoint_returns_structured_result() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        get("/convert?from_currency=usd&to_currency=NGN&amount=100"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from"], "USD");
    assert_eq!(body["to"], "NGN");
    assert_eq!(body["converted"].as_f64(), Some(150000.0));
    assert_eq!(body["rate"].as_f64(), Some(1500.0));
    assert_eq!(body["formatted_converted"], "₦150,000.00");
}

#[tokio::test]
async fn convert_endpoint_reports_missing_target_as_error_value() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        get("/convert?from=USD&to=GBP&amount=5"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch exchange rate for USD to GBP");
}

#[tokio::test]
async fn convert_endpoint_validates_query() {
    let server = upstream().await;
    let app = app_for(server.uri());

    let (status, body) = send(
        app.clone(),
        get("/convert?from_currency=USDT&to_currency=NGN"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("3 letters"));

    let (status, _) = send(
        app.clone(),
        get("/convert?from_currency=USD&to_currency=NGN&amount=-4"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(app, get("/convert?from_currency=USD")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("3 letters"));
}

#[tokio::test]
async fn rates_endpoint_keeps_request_order_and_omits_unknown_codes() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        get("/rates?currencies=eur,XXX,usd"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "NGN");
    let usd = body["rates"]["USD"].as_f64().unwrap();
    assert!((usd - 1492.54).abs() < 1e-9);
    assert!(body["rates"].get("XXX").is_none());
    assert_eq!(
        body["formatted_rates"],
        json!(["1 EUR = ₦1,724.14", "1 USD = ₦1,492.54"])
    );
    assert_eq!(body["message"], "1 EUR = ₦1,724.14 | 1 USD = ₦1,492.54");
}

#[tokio::test]
async fn rates_object_keys_follow_request_order() {
    let server = upstream().await;
    let response = app_for(server.uri())
        .oneshot(get("/rates?currencies=usd,eur"))
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.find("\"USD\":").unwrap() < text.find("\"EUR\":").unwrap());
}

#[tokio::test]
async fn rates_endpoint_surfaces_upstream_failure() {
    let (status, body) = send(app_for("http://127.0.0.1:1".to_string()), get("/rates")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "Couldn't fetch live rates right now.");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn a2a_round_trip_echoes_conversation() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        post_json(
            "/a2a/agent/currencyAgent",
            json!({ "text": "show rates to NGN", "conversationId": "conv-42", "userId": "u-7" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversationId"], "conv-42");
    assert_eq!(body["agentName"], "CurrencyPal");
    assert_eq!(body["metadata"]["userId"], "u-7");
    assert_eq!(body["metadata"]["responseType"], "success");
    assert_eq!(body["metadata"]["intent"], "multi_rate");
    assert!(body["text"]
        .as_str()
        .unwrap()
        .contains("💱 1 JPY = ₦10.00"));
}

#[tokio::test]
async fn a2a_empty_message_is_flagged() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        post_json("/a2a/agent/currencyAgent", json!({ "conversationId": "c-1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "empty_message");
    assert_eq!(body["conversationId"], "c-1");
}

#[tokio::test]
async fn a2a_malformed_envelope_gets_error_reply() {
    let server = upstream().await;
    let (status, body) = send(
        app_for(server.uri()),
        post_json("/a2a/agent/currencyAgent", json!({ "text": 12, "conversationId": "c-2" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversationId"], "c-2");
    assert_eq!(body["metadata"]["responseType"], "error");
}

#[tokio::test]
async fn root_post_routes_a2a_and_info() {
    let server = upstream().await;
    let app = app_for(server.uri());

    let (_, a2a) = send(app.clone(), post_json("/", json!({ "text": "hello" }))).await;
    assert!(a2a["text"].as_str().unwrap().starts_with("Hello! 👋"));

    let (_, info) = send(app, post_json("/", json!({ "ping": true }))).await;
    assert!(info["endpoints"].is_object());
}

#[tokio::test]
async fn responses_carry_generated_request_id() {
    let server = upstream().await;
    let response = app_for(server.uri()).oneshot(get("/health")).await.unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(!request_id.is_empty());
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let server = upstream().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app_for(server.uri()).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn cors_allow_list_admits_only_listed_origins() {
    let server = upstream().await;
    let app = app_with_origins(server.uri(), Some(vec!["https://app.example".to_string()]));

    let from_origin = |origin: &str| {
        Request::builder()
            .uri("/health")
            .header("origin", origin)
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app
        .clone()
        .oneshot(from_origin("https://app.example"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "https://app.example"
    );
    assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");

    let denied = app.oneshot(from_origin("https://evil.example")).await.unwrap();
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn cors_defaults_to_any_origin() {
    let server = upstream().await;
    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://anywhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app_for(server.uri()).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
