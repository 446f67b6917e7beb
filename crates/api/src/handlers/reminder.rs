//! Handlers for the `/reminders` resource.
//!
//! Creation and reactivation pass through the quota gate in
//! [`ReminderRepo`]; refusals surface as 429 `RATE_LIMITED` with the
//! exhausted cap named in the message.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use daybook_core::error::CoreError;
use daybook_core::types::DbId;
use daybook_db::models::reminder::{CreateReminder, UpdateReminder};
use daybook_db::repositories::ReminderRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ActingUser;
use crate::state::AppState;

/// GET /api/v1/reminders
///
/// List the acting user's reminders ordered by next fire time.
pub async fn list_reminders(
    acting: ActingUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let reminders = ReminderRepo::list_for_user(&state.pool, acting.user_id).await?;
    Ok(Json(serde_json::json!({ "data": reminders })))
}

/// POST /api/v1/reminders
///
/// Create a reminder through the quota gate. Returns 201 with the row,
/// 400 on validation failure, 429 when either quota is exhausted.
pub async fn create_reminder(
    acting: ActingUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReminder>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    input
        .validate_reminder_type()
        .map_err(AppError::Validation)?;

    let reminder = ReminderRepo::create(&state.pool, acting.user_id, &input, &state.quota).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "data": reminder })),
    ))
}

/// PATCH /api/v1/reminders/{id}
///
/// Partially update a reminder's editable fields.
pub async fn update_reminder(
    acting: ActingUser,
    State(state): State<AppState>,
    Path(reminder_id): Path<DbId>,
    Json(input): Json<UpdateReminder>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let updated =
        ReminderRepo::update(&state.pool, acting.user_id, reminder_id, &input).await?;

    let Some(reminder) = updated else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Reminder",
            id: reminder_id,
        }));
    };

    Ok(Json(serde_json::json!({ "data": reminder })))
}

/// POST /api/v1/reminders/{id}/toggle
///
/// Flip a reminder's active flag. Reactivation passes through the same
/// dual-cap quota gate as creation; deactivation always succeeds.
pub async fn toggle_reminder(
    acting: ActingUser,
    State(state): State<AppState>,
    Path(reminder_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let reminder =
        ReminderRepo::toggle_active(&state.pool, acting.user_id, reminder_id, &state.quota)
            .await?;

    Ok(Json(serde_json::json!({ "data": reminder })))
}

/// DELETE /api/v1/reminders/{id}
///
/// Remove a reminder. Returns 204 No Content on success, 404 if the
/// reminder does not belong to the acting user.
pub async fn delete_reminder(
    acting: ActingUser,
    State(state): State<AppState>,
    Path(reminder_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let found = ReminderRepo::delete(&state.pool, acting.user_id, reminder_id).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Reminder",
            id: reminder_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/reminders/limits
///
/// Report the acting user's quota usage. Side-effect-free; enforcement
/// happens only on the write paths.
pub async fn quota_status(
    acting: ActingUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let status = ReminderRepo::quota_status(&state.pool, acting.user_id, &state.quota).await?;
    Ok(Json(serde_json::json!({ "data": status })))
}
