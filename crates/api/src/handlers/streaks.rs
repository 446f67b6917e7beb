//! Streak read endpoint for the UI.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use daybook_core::streak::{compute_streaks, fallback_title, milestone_for};

use crate::error::AppResult;
use crate::extract::ActingUser;
use crate::state::AppState;

/// GET /api/v1/streaks
///
/// Recomputes the acting user's streaks from the entry-day ledger (rather
/// than trusting the denormalized snapshot) and reports the milestone copy
/// for the current length.
pub async fn get_streaks(
    acting: ActingUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let dates = daybook_db::repositories::StreakRepo::entry_dates(&state.pool, acting.user_id)
        .await?
        .into_iter()
        .collect();

    let stats = compute_streaks(&dates, Utc::now().date_naive());

    let milestone_title = match milestone_for(stats.current_streak) {
        Some(m) => Some(m.title.to_string()),
        None if stats.current_streak > 0 => Some(fallback_title(stats.current_streak)),
        None => None,
    };

    Ok(Json(serde_json::json!({
        "data": {
            "current_streak": stats.current_streak,
            "longest_streak": stats.longest_streak,
            "milestone_title": milestone_title,
        }
    })))
}
