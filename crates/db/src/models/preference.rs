//! Notification preference entity.
//!
//! Owned and mutated by the user via the settings screens; the delivery
//! pipeline only ever reads these rows.

use daybook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notification_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub user_id: DbId,
    /// Master switch; when `false`, no email of any kind is sent.
    pub email_reminders_enabled: bool,
    pub email_frequency: String,
    pub daily_reminder: bool,
    pub reminder_time: chrono::NaiveTime,
    /// ISO weekday numbers (1 = Monday .. 7 = Sunday).
    pub reminder_days: Vec<i16>,
    pub timezone: String,
    pub weekly_reminder: bool,
    pub milestone_notifications: bool,
    pub streak_notifications: bool,
    pub updated_at: Timestamp,
}

impl NotificationPreference {
    /// Whether an email of the given job type may be sent to this user.
    ///
    /// The master switch gates everything; each job type additionally has its
    /// own toggle.
    pub fn allows(&self, job_type: &str) -> bool {
        if !self.email_reminders_enabled {
            return false;
        }
        match job_type {
            "daily_reminder" => self.daily_reminder,
            "weekly_summary" => self.weekly_reminder,
            "streak_milestone" => self.milestone_notifications,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(master: bool, daily: bool) -> NotificationPreference {
        NotificationPreference {
            user_id: 1,
            email_reminders_enabled: master,
            email_frequency: "daily".into(),
            daily_reminder: daily,
            reminder_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            reminder_days: vec![1, 2, 3, 4, 5, 6, 7],
            timezone: "UTC".into(),
            weekly_reminder: true,
            milestone_notifications: true,
            streak_notifications: true,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn master_switch_gates_all_types() {
        let p = pref(false, true);
        assert!(!p.allows("daily_reminder"));
        assert!(!p.allows("weekly_summary"));
        assert!(!p.allows("streak_milestone"));
    }

    #[test]
    fn per_type_toggle_applies_under_master_switch() {
        let p = pref(true, false);
        assert!(!p.allows("daily_reminder"));
        assert!(p.allows("weekly_summary"));
    }

    #[test]
    fn unknown_job_type_is_never_allowed() {
        assert!(!pref(true, true).allows("carrier_pigeon"));
    }
}
