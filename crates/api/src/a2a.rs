//! Agent-to-agent endpoint: a flat `{text, conversationId}` envelope around
//! the same responder used by `/chat`.

use axum::extract::{Json, State};
use axum::response::IntoResponse;
use currencypal_core::replies::AGENT_NAME;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::ApiState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub response_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aResponse {
    pub text: String,
    pub conversation_id: String,
    pub agent_name: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<A2aMetadata>,
}

impl A2aResponse {
    fn new(text: String, conversation_id: String) -> Self {
        Self {
            text,
            conversation_id,
            agent_name: AGENT_NAME.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: None,
            metadata: None,
        }
    }
}

pub(crate) async fn a2a_agent(
    State(state): State<ApiState>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    Json(handle(&state, body).await)
}

/// Malformed envelopes still get an A2A-shaped reply instead of a rejection.
pub(crate) async fn handle(state: &ApiState, body: Value) -> A2aResponse {
    let fallback_conversation = body
        .get("conversationId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let request = match serde_json::from_value::<A2aRequest>(body) {
        Ok(request) => request,
        Err(error) => {
            warn!(error = %error, "invalid a2a envelope");
            let mut response = A2aResponse::new(
                format!(
                    "I encountered an error processing your request. Please try again! 🔧\n\nError: {error}"
                ),
                fallback_conversation,
            );
            response.metadata = Some(A2aMetadata {
                user_id: None,
                response_type: "error".to_string(),
                intent: None,
                error_details: Some(error.to_string()),
            });
            return response;
        }
    };

    if request.text.trim().is_empty() {
        let mut response = A2aResponse::new(
            "I didn't receive any message. Please try again! 😊".to_string(),
            request.conversation_id,
        );
        response.error = Some("empty_message".to_string());
        return response;
    }

    let reply = state.agent.reply(&request.text).await;
    let mut response = A2aResponse::new(reply.text, request.conversation_id);
    response.metadata = Some(A2aMetadata {
        user_id: Some(request.user_id),
        response_type: "success".to_string(),
        intent: Some(reply.intent.label().to_string()),
        error_details: None,
    });
    response
}
