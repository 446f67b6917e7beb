//! Streak snapshot entity.
//!
//! Maintained by the external entry-lifecycle logic; read-only to this core.

use daybook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `streak_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StreakSnapshot {
    pub user_id: DbId,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_entries: i32,
    pub updated_at: Timestamp,
}
