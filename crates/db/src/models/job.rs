//! Notification job entity and its lifecycle status.

use daybook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Lifecycle status of a [`NotificationJob`].
///
/// `Pending -> Processing -> Sent | Failed | Skipped`. The three right-hand
/// states are terminal; `Skipped` marks preference opt-outs so operators can
/// tell them apart from genuine delivery failures. A `Processing` job whose
/// worker times out is released back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Sent,
    Failed,
    Skipped,
}

impl JobStatus {
    /// Wire name as stored in the `notification_jobs.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Sent => "sent",
            JobStatus::Failed => "failed",
            JobStatus::Skipped => "skipped",
        }
    }

    /// `true` for statuses that allow no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Sent | JobStatus::Failed | JobStatus::Skipped)
    }
}

/// A row from the `notification_jobs` table.
///
/// Rows are created by the external scheduler and never deleted; the table
/// doubles as the delivery audit trail.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationJob {
    pub id: DbId,
    pub user_id: DbId,
    /// Recipient address, denormalized at enqueue time.
    pub email: String,
    /// One of `daily_reminder`, `weekly_summary`, `streak_milestone`.
    pub job_type: String,
    pub status: String,
    pub scheduled_for: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}
