//! Liveness endpoint.

use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Verifies the database is reachable before reporting healthy.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    daybook_db::health_check(&state.pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}
