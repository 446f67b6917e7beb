//! Repository for streak data: the externally maintained snapshot and the
//! activity-day ledger the streak engine recomputes from.

use chrono::NaiveDate;
use daybook_core::types::DbId;
use sqlx::PgPool;

use crate::models::streak::StreakSnapshot;

/// Column list for `streak_snapshots` queries.
const COLUMNS: &str = "user_id, current_streak, longest_streak, total_entries, updated_at";

/// Read access to streak snapshots and entry days.
pub struct StreakRepo;

impl StreakRepo {
    /// Get the streak snapshot for a user, if one exists.
    ///
    /// A missing row simply means the user has never written an entry;
    /// callers treat it as all-zero counts.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StreakSnapshot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM streak_snapshots WHERE user_id = $1");
        sqlx::query_as::<_, StreakSnapshot>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Distinct calendar days on which the user produced at least one entry.
    ///
    /// Input to `daybook_core::streak::compute_streaks`; the ledger itself is
    /// written by the external entry lifecycle.
    pub async fn entry_dates(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        sqlx::query_scalar("SELECT day FROM entry_days WHERE user_id = $1 ORDER BY day")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
