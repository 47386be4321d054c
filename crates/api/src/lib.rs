mod a2a;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use currencypal_agents::CurrencyAgent;
use currencypal_core::{parse_amount, replies, CurrencyCode, ErrorBody, HOME_CURRENCY};
use currencypal_observability::{AppMetrics, MetricsSnapshot};
use currencypal_rates::{RateClient, RateClientConfig, RateSource};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use a2a::{A2aMetadata, A2aRequest, A2aResponse};

const MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_RATE_CODES_QUERY: &str = "USD,EUR,GBP,JPY,CAD";

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<CurrencyAgent<RateClient>>,
    pub metrics: Arc<AppMetrics>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    pub rates: RateClientConfig,
    /// `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            rates: RateClientConfig::from_env(),
            allowed_origins: parse_allowed_origins(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    metrics: MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct ConvertQuery {
    #[serde(default, alias = "from")]
    from_currency: Option<String>,
    #[serde(default, alias = "to")]
    to_currency: Option<String>,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RatesQuery {
    currencies: Option<String>,
}

#[derive(Debug, Serialize)]
struct RatesResponse {
    base: &'static str,
    rates: OrderedRates,
    formatted_rates: Vec<String>,
    message: String,
}

/// Serializes as a JSON object whose keys keep request order.
#[derive(Debug)]
struct OrderedRates(Vec<(String, Decimal)>);

impl Serialize for OrderedRates {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, rate) in &self.0 {
            map.serialize_entry(code, rate)?;
        }
        map.end()
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

pub fn build_app(config: ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let client = RateClient::new(config.rates.clone()).context("failed to build rates client")?;
    let agent = Arc::new(CurrencyAgent::new(Arc::new(client), metrics.clone()));

    let state = ApiState { agent, metrics };
    Ok(build_router(state, config.allowed_origins.as_deref()))
}

pub fn build_router(state: ApiState, allowed_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/", get(root_info).post(root_post))
        .route("/health", get(health))
        .route("/convert", get(convert))
        .route("/rates", get(rates))
        .route("/chat", post(chat))
        .route("/a2a/agent/currencyAgent", post(a2a::a2a_agent))
        .layer(build_cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

fn service_info() -> serde_json::Value {
    json!({
        "message": format!("Welcome to {}! 💱", replies::AGENT_NAME),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "/convert?from_currency=USD&to_currency=NGN&amount=50",
            "rates": "/rates?currencies=USD,EUR,GBP",
            "chat": "POST /chat with {text: 'your message'}",
            "a2a": "POST /a2a/agent/currencyAgent",
            "health": "/health"
        }
    })
}

async fn root_info() -> impl IntoResponse {
    Json(service_info())
}

/// Some A2A callers post to the base URL.
async fn root_post(
    State(state): State<ApiState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let looks_like_a2a = body.get("text").is_some() || body.get("conversationId").is_some();
    if looks_like_a2a {
        Json(a2a::handle(&state, body).await).into_response()
    } else {
        Json(service_info()).into_response()
    }
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "healthy",
        service: replies::AGENT_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn convert(State(state): State<ApiState>, Query(query): Query<ConvertQuery>) -> Response {
    let (Some(from), Some(to)) = (
        query.from_currency.as_deref().and_then(CurrencyCode::parse),
        query.to_currency.as_deref().and_then(CurrencyCode::parse),
    ) else {
        return unprocessable("Currency codes must be 3 letters, e.g. USD or NGN");
    };

    let amount = match query.amount.as_deref() {
        None => Decimal::ONE,
        Some(raw) => match parse_amount(raw) {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return unprocessable("Amount must be a positive number"),
        },
    };

    state.metrics.inc_request();
    state.metrics.inc_conversion();

    match state.agent.rates().convert(&from, &to, amount).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => {
            state.metrics.inc_upstream_error(error.kind());
            warn!(kind = error.kind(), error = %error, "convert endpoint failed");
            (StatusCode::BAD_GATEWAY, Json(error.to_body())).into_response()
        }
    }
}

async fn rates(State(state): State<ApiState>, Query(query): Query<RatesQuery>) -> Response {
    let requested = query
        .currencies
        .as_deref()
        .unwrap_or(DEFAULT_RATE_CODES_QUERY);
    let codes = requested
        .split(',')
        .filter_map(CurrencyCode::parse)
        .collect::<Vec<_>>();

    state.metrics.inc_request();
    state.metrics.inc_rate_lookup();

    match state.agent.rates().rates_to_base(Some(codes.as_slice())).await {
        Ok(table) => {
            let formatted_rates = table.formatted_lines();
            let payload = RatesResponse {
                base: HOME_CURRENCY,
                rates: OrderedRates(
                    table
                        .iter()
                        .map(|(code, entry)| (code.to_string(), entry.rate))
                        .collect(),
                ),
                message: formatted_rates.join(" | "),
                formatted_rates,
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            state.metrics.inc_upstream_error(error.kind());
            warn!(kind = error.kind(), error = %error, "rates endpoint failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "message": "Couldn't fetch live rates right now.",
                    "error": error.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    let text = request.text.unwrap_or_default();
    let response = state.agent.process_message(text.trim()).await;
    Json(ChatResponse { response })
}

fn unprocessable(message: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::new(message))).into_response()
}

fn parse_allowed_origins() -> Option<Vec<String>> {
    env::var("CURRENCYPAL_ALLOWED_ORIGINS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty())
}

fn build_cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let base = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let origins = allowed_origins
        .unwrap_or_default()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        base.allow_origin(Any).allow_headers(Any)
    } else {
        base.allow_origin(AllowOrigin::list(origins))
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    }
}
