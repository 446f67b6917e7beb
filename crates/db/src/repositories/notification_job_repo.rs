//! Repository for the `notification_jobs` table.
//!
//! Jobs are enqueued by the external scheduler and consumed here. Rows are
//! never deleted; terminal status plus `error_message` form the audit trail
//! operators inspect when deliveries go wrong.

use daybook_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::job::{JobStatus, NotificationJob};

/// Column list for `notification_jobs` queries.
const COLUMNS: &str =
    "id, user_id, email, job_type, status, scheduled_for, sent_at, error_message, created_at";

/// Provides lifecycle operations for notification jobs.
pub struct NotificationJobRepo;

impl NotificationJobRepo {
    /// Atomically claim up to `limit` due pending jobs.
    ///
    /// Moves the selected rows to `processing` in the same statement using
    /// `FOR UPDATE SKIP LOCKED`, so two overlapping invocations can never
    /// claim the same row. Oldest due rows are selected first.
    pub async fn claim_due_batch(
        pool: &PgPool,
        now: Timestamp,
        limit: i64,
    ) -> Result<Vec<NotificationJob>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_jobs SET status = $1 \
             WHERE id IN ( \
                 SELECT id FROM notification_jobs \
                 WHERE status = $2 AND scheduled_for <= $3 \
                 ORDER BY scheduled_for ASC \
                 LIMIT $4 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationJob>(&query)
            .bind(JobStatus::Processing.as_str())
            .bind(JobStatus::Pending.as_str())
            .bind(now)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a claimed job as successfully delivered.
    pub async fn mark_sent(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_jobs \
             SET status = $2, sent_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(job_id)
        .bind(JobStatus::Sent.as_str())
        .bind(JobStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a claimed job as failed, capturing the error message verbatim.
    pub async fn mark_failed(
        pool: &PgPool,
        job_id: DbId,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_jobs \
             SET status = $2, error_message = $3 \
             WHERE id = $1 AND status = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.as_str())
        .bind(error)
        .bind(JobStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a claimed job as skipped (preference opt-out).
    ///
    /// Distinct from `failed` so operators can separate opt-outs from
    /// genuine delivery problems.
    pub async fn mark_skipped(
        pool: &PgPool,
        job_id: DbId,
        reason: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_jobs \
             SET status = $2, error_message = $3 \
             WHERE id = $1 AND status = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Skipped.as_str())
        .bind(reason)
        .bind(JobStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Release a claimed job back to `pending` for the next trigger.
    ///
    /// Used when per-job processing times out; the job keeps at-least-once
    /// semantics instead of being buried in a terminal state.
    pub async fn release(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_jobs \
             SET status = $2 \
             WHERE id = $1 AND status = $3",
        )
        .bind(job_id)
        .bind(JobStatus::Pending.as_str())
        .bind(JobStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Find a job by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<NotificationJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_jobs WHERE id = $1");
        sqlx::query_as::<_, NotificationJob>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
