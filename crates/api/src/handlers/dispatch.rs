//! The external scheduler's dispatch trigger.

use axum::extract::State;
use axum::Json;
use daybook_notify::QueueConsumer;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/notifications/dispatch
///
/// Runs one queue-consumer invocation: claim due jobs, deliver, record
/// outcomes. Requires no body; the caller is a cron-like trigger. A failure
/// to claim the batch is the only error surfaced at the top level (no job
/// was touched in that case); per-job failures appear in `results`.
pub async fn dispatch(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let smtp = state
        .smtp
        .clone()
        .ok_or_else(|| AppError::Unavailable("SMTP delivery is not configured".to_string()))?;

    let consumer = QueueConsumer::new(state.pool.clone(), smtp, state.config.app_url.clone());
    let summary = consumer.run_once().await?;

    Ok(Json(serde_json::json!({
        "data": {
            "success": true,
            "processed": summary.processed,
            "successful": summary.successful,
            "failed": summary.failed,
            "skipped": summary.skipped,
            "results": summary.results,
        }
    })))
}
