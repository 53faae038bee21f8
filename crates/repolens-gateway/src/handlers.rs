use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use repolens_llm::Message;

use super::server::AppState;

/// Inbound chat request. Only `messages` is read; other fields are ignored.
#[derive(serde::Deserialize)]
pub(crate) struct ChatCompletionRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    agents: usize,
}

/// Always answers 200: backend failures are reported in the body.
pub(crate) async fn chat_completions_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> impl IntoResponse {
    tracing::debug!(messages = request.messages.len(), "chat completion request");
    let result = state.forwarder.forward(&request.messages).await;
    Json(result.into_json())
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        agents: state.forwarder.aggregator().len(),
    })
}
