use std::sync::Arc;

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use munchy_agent::Resolver;
use munchy_db::ConversationRepository;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub conversations: Arc<dyn ConversationRepository>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
    pub timestamp: String,
    pub elapsed_seconds: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ServiceBanner {
    pub service: &'static str,
    pub version: &'static str,
    pub strategies: [&'static str; 3],
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn root() -> Json<ServiceBanner> {
    Json(ServiceBanner {
        service: "munchy",
        version: env!("CARGO_PKG_VERSION"),
        strategies: ["rules", "cache", "generative"],
    })
}

pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Json<ChatResponse> {
    let resolution = state.resolver.resolve(&request.message, request.session_id.as_deref()).await;

    // Durable logging happens off the response path.
    let record = resolution.record(&request.message);
    let conversations = state.conversations.clone();
    tokio::spawn(async move {
        if let Err(error) = conversations.append(&record).await {
            tracing::warn!(
                event_name = "chat.log.append_failed",
                session_id = %record.session_id,
                error = %error,
                "conversation log write failed"
            );
        }
    });

    let elapsed_seconds = (resolution.elapsed.as_secs_f64() * 100.0).round() / 100.0;
    Json(ChatResponse {
        reply: resolution.reply,
        session_id: resolution.session_id,
        timestamp: resolution.timestamp.to_rfc3339(),
        elapsed_seconds: Some(elapsed_seconds),
    })
}
