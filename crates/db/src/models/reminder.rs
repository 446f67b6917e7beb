//! Custom reminder entity and DTOs.

use daybook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Recognised values for `custom_reminders.reminder_type`.
pub const REMINDER_TYPES: [&str; 4] = ["once", "daily", "weekly", "custom"];

/// A row from the `custom_reminders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CustomReminder {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub next_reminder_at: Timestamp,
    /// One of `once`, `daily`, `weekly`, `custom`. Advancing
    /// `next_reminder_at` for the recurring types is the external
    /// scheduler's responsibility.
    pub reminder_type: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a custom reminder.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReminder {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub next_reminder_at: Timestamp,
    pub reminder_type: String,
}

impl CreateReminder {
    /// Validate fields the derive can't express.
    pub fn validate_reminder_type(&self) -> Result<(), String> {
        if REMINDER_TYPES.contains(&self.reminder_type.as_str()) {
            Ok(())
        } else {
            Err(format!(
                "reminder_type must be one of: {}",
                REMINDER_TYPES.join(", ")
            ))
        }
    }
}

/// DTO for partially updating a custom reminder.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReminder {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub next_reminder_at: Option<Timestamp>,
    pub reminder_type: Option<String>,
}
