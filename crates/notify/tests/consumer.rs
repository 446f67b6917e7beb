//! Integration tests for the queue consumer.
//!
//! Runs the consumer against a real database with an SMTP config pointing at
//! a closed local port, so delivery attempts fail fast at connect time. That
//! makes the outcomes observable without a live relay:
//! - An opted-out job ends `skipped`; a job that reached the transport would
//!   have ended `failed` with a connection error instead
//! - One job's delivery failure never blocks the rest of the batch
//! - A timed-out job is released back to `pending` for the next invocation

use std::time::Duration;

use chrono::Utc;
use daybook_notify::{QueueConsumer, SmtpConfig};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// SMTP config for a port nothing listens on; connects are refused.
fn dead_smtp() -> SmtpConfig {
    SmtpConfig {
        smtp_host: "127.0.0.1".to_string(),
        smtp_port: 1,
        from_address: "noreply@daybook.local".to_string(),
        smtp_user: None,
        smtp_password: None,
    }
}

fn consumer(pool: &PgPool) -> QueueConsumer {
    QueueConsumer::new(pool.clone(), dead_smtp(), "http://localhost:5173")
}

async fn new_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (display_name, email) VALUES ($1, $2) RETURNING id")
        .bind("Ada")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn set_preferences(pool: &PgPool, user_id: i64, master: bool, daily: bool) {
    sqlx::query(
        "INSERT INTO notification_preferences (user_id, email_reminders_enabled, daily_reminder) \
         VALUES ($1, $2, $3)",
    )
    .bind(user_id)
    .bind(master)
    .bind(daily)
    .execute(pool)
    .await
    .unwrap();
}

async fn enqueue_due(pool: &PgPool, user_id: i64, email: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO notification_jobs (user_id, email, job_type, scheduled_for) \
         VALUES ($1, $2, 'daily_reminder', $3) RETURNING id",
    )
    .bind(user_id)
    .bind(email)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn status_of(pool: &PgPool, job_id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM notification_jobs WHERE id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn opted_out_job_is_skipped_without_a_delivery_attempt(pool: PgPool) {
    let user_id = new_user(&pool, "optout@example.com").await;
    set_preferences(&pool, user_id, true, false).await;
    let job_id = enqueue_due(&pool, user_id, "optout@example.com").await;

    let summary = consumer(&pool).run_once().await.unwrap();

    // A delivery attempt against the dead relay would have recorded `failed`
    // with a connection error; `skipped` proves the transport was never used.
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(status_of(&pool, job_id).await, "skipped");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_preference_row_counts_as_opted_out(pool: PgPool) {
    let user_id = new_user(&pool, "nopefs@example.com").await;
    let job_id = enqueue_due(&pool, user_id, "nopefs@example.com").await;

    let summary = consumer(&pool).run_once().await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(status_of(&pool, job_id).await, "skipped");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn one_delivery_failure_does_not_block_the_rest_of_the_batch(pool: PgPool) {
    let failing = new_user(&pool, "failing@example.com").await;
    set_preferences(&pool, failing, true, true).await;
    let failing_job = enqueue_due(&pool, failing, "failing@example.com").await;

    let opted_out = new_user(&pool, "quiet@example.com").await;
    set_preferences(&pool, opted_out, false, true).await;
    let skipped_job = enqueue_due(&pool, opted_out, "quiet@example.com").await;

    let also_failing = new_user(&pool, "also-failing@example.com").await;
    set_preferences(&pool, also_failing, true, true).await;
    let second_failing_job = enqueue_due(&pool, also_failing, "also-failing@example.com").await;

    let summary = consumer(&pool).run_once().await.unwrap();

    // Every claimed job reached a terminal outcome despite the failures.
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(status_of(&pool, failing_job).await, "failed");
    assert_eq!(status_of(&pool, second_failing_job).await, "failed");
    assert_eq!(status_of(&pool, skipped_job).await, "skipped");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delivery_failure_captures_the_transport_error(pool: PgPool) {
    let user_id = new_user(&pool, "capture@example.com").await;
    set_preferences(&pool, user_id, true, true).await;
    let job_id = enqueue_due(&pool, user_id, "capture@example.com").await;

    let summary = consumer(&pool).run_once().await.unwrap();

    assert_eq!(summary.failed, 1);
    let message: Option<String> =
        sqlx::query_scalar("SELECT error_message FROM notification_jobs WHERE id = $1")
            .bind(job_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(message.is_some_and(|m| !m.is_empty()));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn timed_out_job_is_released_back_to_pending(pool: PgPool) {
    let user_id = new_user(&pool, "slow@example.com").await;
    set_preferences(&pool, user_id, true, true).await;
    let job_id = enqueue_due(&pool, user_id, "slow@example.com").await;

    let summary = consumer(&pool)
        .with_job_timeout(Duration::ZERO)
        .run_once()
        .await
        .unwrap();

    // Counted against this invocation, but retryable by the next one.
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.results[0].status, "pending");
    assert_eq!(status_of(&pool, job_id).await, "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_queue_yields_an_empty_summary(pool: PgPool) {
    let summary = consumer(&pool).run_once().await.unwrap();
    assert_eq!(summary.processed, 0);
    assert!(summary.results.is_empty());
}
