//! Repository for the `custom_reminders` table, including the quota gate.
//!
//! Creation and reactivation are rate limited by two independent caps: rows
//! created since UTC midnight, and rows currently active. The count and the
//! write happen inside one transaction holding a per-user advisory lock, so
//! two concurrent requests from the same user cannot both pass the check.
//! The read path (`quota_status`) is side-effect-free.

use chrono::Utc;
use daybook_core::quota::{QuotaConfig, RateLimitStatus};
use daybook_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::reminder::{CreateReminder, CustomReminder, UpdateReminder};

/// Column list for `custom_reminders` queries.
const COLUMNS: &str =
    "id, user_id, title, description, next_reminder_at, reminder_type, is_active, created_at";

/// Advisory lock namespace for the reminder quota gate. XORed with the user
/// id so the gate does not collide with other advisory locks on raw ids.
const QUOTA_LOCK_SEED: i64 = 0x4452_4d44_0000_0000; // "DRMD"

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Refusals and failures from the quota-gated write paths.
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// The per-day creation cap is exhausted.
    #[error("Daily reminder limit reached ({created} of {max} created today)")]
    DailyLimit { created: i64, max: i64 },

    /// The active-reminder cap is exhausted.
    #[error("Active reminder limit reached ({active} of {max} active)")]
    ActiveLimit { active: i64, max: i64 },

    /// The reminder being updated does not exist or belongs to another user.
    #[error("Reminder {0} not found")]
    NotFound(DbId),

    /// Underlying database failure.
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

// ---------------------------------------------------------------------------
// ReminderRepo
// ---------------------------------------------------------------------------

/// CRUD plus quota enforcement for custom reminders.
pub struct ReminderRepo;

impl ReminderRepo {
    /// List a user's reminders ordered by next fire time.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CustomReminder>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM custom_reminders \
             WHERE user_id = $1 \
             ORDER BY next_reminder_at ASC"
        );
        sqlx::query_as::<_, CustomReminder>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Current quota usage for a user. Read-only; enforcement happens in the
    /// write paths.
    pub async fn quota_status(
        pool: &PgPool,
        user_id: DbId,
        config: &QuotaConfig,
    ) -> Result<RateLimitStatus, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let (created_today, active) = Self::counts(&mut conn, user_id).await?;
        Ok(RateLimitStatus::derive(created_today, active, config))
    }

    /// Create a reminder through the quota gate.
    ///
    /// Holds a per-user advisory lock for the duration of the transaction so
    /// the count-then-insert pair is atomic with respect to other gated
    /// writes for the same user.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReminder,
        config: &QuotaConfig,
    ) -> Result<CustomReminder, QuotaError> {
        let mut tx = pool.begin().await?;
        Self::lock_user(&mut tx, user_id).await?;
        Self::enforce_caps(&mut tx, user_id, config).await?;

        let query = format!(
            "INSERT INTO custom_reminders \
                (user_id, title, description, next_reminder_at, reminder_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let reminder = sqlx::query_as::<_, CustomReminder>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.next_reminder_at)
            .bind(&input.reminder_type)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reminder)
    }

    /// Flip a reminder's `is_active` flag.
    ///
    /// Deactivation is always allowed; reactivation goes through the same
    /// dual-cap gate as creation, so neither an exhausted daily-creation cap
    /// nor an exhausted active cap can be bypassed by toggling.
    pub async fn toggle_active(
        pool: &PgPool,
        user_id: DbId,
        reminder_id: DbId,
        config: &QuotaConfig,
    ) -> Result<CustomReminder, QuotaError> {
        let mut tx = pool.begin().await?;
        Self::lock_user(&mut tx, user_id).await?;

        let current: Option<bool> = sqlx::query_scalar(
            "SELECT is_active FROM custom_reminders WHERE id = $1 AND user_id = $2",
        )
        .bind(reminder_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(is_active) = current else {
            return Err(QuotaError::NotFound(reminder_id));
        };

        if !is_active {
            Self::enforce_caps(&mut tx, user_id, config).await?;
        }

        let query = format!(
            "UPDATE custom_reminders SET is_active = NOT is_active \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        let reminder = sqlx::query_as::<_, CustomReminder>(&query)
            .bind(reminder_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reminder)
    }

    /// Partially update a reminder's editable fields.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        reminder_id: DbId,
        input: &UpdateReminder,
    ) -> Result<Option<CustomReminder>, sqlx::Error> {
        let query = format!(
            "UPDATE custom_reminders SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                next_reminder_at = COALESCE($5, next_reminder_at), \
                reminder_type = COALESCE($6, reminder_type) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CustomReminder>(&query)
            .bind(reminder_id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.next_reminder_at)
            .bind(&input.reminder_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete a reminder. Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        user_id: DbId,
        reminder_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM custom_reminders WHERE id = $1 AND user_id = $2")
            .bind(reminder_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Take the per-user advisory lock for the current transaction.
    async fn lock_user(conn: &mut PgConnection, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(QUOTA_LOCK_SEED ^ user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Count rows created since UTC midnight and rows currently active.
    async fn counts(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        let midnight = Utc::now()
            .date_naive()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();

        let row: (i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE created_at >= $2), \
                COUNT(*) FILTER (WHERE is_active) \
             FROM custom_reminders WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(midnight)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }

    /// Refuse if either cap is at or over its ceiling. Both caps are checked
    /// independently; being under one never excuses the other.
    async fn enforce_caps(
        conn: &mut PgConnection,
        user_id: DbId,
        config: &QuotaConfig,
    ) -> Result<(), QuotaError> {
        let (created_today, active) = Self::counts(conn, user_id).await?;

        if created_today >= config.max_per_day {
            return Err(QuotaError::DailyLimit {
                created: created_today,
                max: config.max_per_day,
            });
        }
        if active >= config.max_active {
            return Err(QuotaError::ActiveLimit {
                active,
                max: config.max_active,
            });
        }
        Ok(())
    }
}
