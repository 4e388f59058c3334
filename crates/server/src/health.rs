use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use munchy_agent::LlmClient;
use munchy_db::DbPool;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    llm: Arc<dyn LlmClient>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: HealthCheck,
    pub generator: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, llm: Arc<dyn LlmClient>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, llm })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let generator = generator_check(state.llm.as_ref()).await;
    let ready = database.status == "ready" && generator.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        database,
        generator,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

async fn generator_check(llm: &dyn LlmClient) -> HealthCheck {
    match llm.ensure_available().await {
        Ok(()) => HealthCheck { status: "ready", detail: "generator backend reachable".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("generator check failed: {error}") }
        }
    }
}
