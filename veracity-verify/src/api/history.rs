//! Verification history endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::models::VerificationResult;
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for GET /api/verificationHistory
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<String>,
    pub limit: Option<u32>,
}

/// GET /api/verificationHistory?userId=…&limit=…
///
/// Newest first. `limit` defaults to the configured history limit and is
/// capped at the configured maximum.
pub async fn verification_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<VerificationResult>>> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;

    let limit = effective_limit(
        query.limit,
        state.limits.history_limit,
        state.limits.max_history_limit,
    );

    let history = crate::db::verifications::load_history(&state.db, user_id, limit).await?;

    tracing::debug!(user_id = %user_id, count = history.len(), "Loaded verification history");

    Ok(Json(history))
}

/// Requested limit, else the default, kept within `1..=max`
pub fn effective_limit(requested: Option<u32>, default: u32, max: u32) -> u32 {
    let max = max.max(1);
    requested.unwrap_or(default).clamp(1, max)
}

/// Build history routes
pub fn history_routes() -> Router<AppState> {
    Router::new().route("/api/verificationHistory", get(verification_history))
}
