//! Service health and provider readiness
//!
//! `status` drops to "degraded" once a result save has failed; verification
//! itself keeps working, so the endpoint still answers 200.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub providers: ProviderReadiness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Which external checks have credentials; an unconfigured one scores neutral
#[derive(Debug, Serialize)]
pub struct ProviderReadiness {
    pub reverse_search: bool,
    pub ai_detection: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;
    let last_error = state.last_error.read().await.clone();

    Json(HealthResponse {
        status: if last_error.is_some() { "degraded" } else { "ok" },
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        providers: ProviderReadiness {
            reverse_search: state.verifier.similarity().is_configured(),
            ai_detection: state.verifier.generation().is_configured(),
        },
        last_error,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
