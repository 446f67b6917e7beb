//! Repository for the `notification_preferences` table.
//!
//! Preferences are written by the settings collaborator; this core only
//! reads them when deciding whether a job may be delivered.

use daybook_core::types::DbId;
use sqlx::PgPool;

use crate::models::preference::NotificationPreference;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "user_id, email_reminders_enabled, email_frequency, daily_reminder, \
    reminder_time, reminder_days, timezone, weekly_reminder, milestone_notifications, \
    streak_notifications, updated_at";

/// Read access to notification preferences.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// Get the preference row for a user, if one exists.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
