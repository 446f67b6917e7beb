//! Custom-reminder quota configuration and derived status.
//!
//! Two independent caps govern reminder creation and reactivation: a rolling
//! per-day creation cap (UTC day window) and a cap on concurrently active
//! reminders. The enforcement itself happens in the repository layer inside a
//! transaction; this module only carries the configuration and the derived,
//! never-stored status reported to the UI.

use chrono::{Days, NaiveTime, Utc};
use serde::Serialize;

use crate::types::Timestamp;

/// Default maximum reminders a user may create per UTC day.
const DEFAULT_MAX_PER_DAY: i64 = 10;

/// Default maximum concurrently active reminders per user.
const DEFAULT_MAX_ACTIVE: i64 = 25;

/// Ceilings for the two reminder quotas.
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    /// Maximum reminders created per UTC day.
    pub max_per_day: i64,
    /// Maximum reminders with `is_active = true` at any time.
    pub max_active: i64,
}

impl QuotaConfig {
    /// Load quota ceilings from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `REMINDER_MAX_PER_DAY` | `10`    |
    /// | `REMINDER_MAX_ACTIVE`  | `25`    |
    pub fn from_env() -> Self {
        let parse = |var: &str, default: i64| {
            std::env::var(var)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            max_per_day: parse("REMINDER_MAX_PER_DAY", DEFAULT_MAX_PER_DAY),
            max_active: parse("REMINDER_MAX_ACTIVE", DEFAULT_MAX_ACTIVE),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_per_day: DEFAULT_MAX_PER_DAY,
            max_active: DEFAULT_MAX_ACTIVE,
        }
    }
}

/// Point-in-time quota usage for one user. Derived per request, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    pub reminders_created_today: i64,
    pub max_reminders_per_day: i64,
    pub active_reminders: i64,
    pub max_active_reminders: i64,
    /// `true` only while both caps have headroom.
    pub can_create_more: bool,
    /// When the daily creation window resets (next UTC midnight).
    pub reset_at: Timestamp,
}

impl RateLimitStatus {
    /// Derive the status from raw counts and the configured ceilings.
    pub fn derive(created_today: i64, active: i64, config: &QuotaConfig) -> Self {
        Self {
            reminders_created_today: created_today,
            max_reminders_per_day: config.max_per_day,
            active_reminders: active,
            max_active_reminders: config.max_active,
            can_create_more: created_today < config.max_per_day && active < config.max_active,
            reset_at: next_utc_midnight(),
        }
    }
}

/// The next UTC midnight after now.
fn next_utc_midnight() -> Timestamp {
    let tomorrow = Utc::now().date_naive() + Days::new(1);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}
