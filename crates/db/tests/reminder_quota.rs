//! Integration tests for the reminder quota gate.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Creation is refused once either cap is exhausted, and refusal writes no row
//! - Reactivation passes through the same dual-cap gate as creation
//! - Deactivation always succeeds, even with both caps exhausted
//! - The read-only status endpoint reflects the counts without side effects

use chrono::{Days, Utc};
use daybook_core::quota::QuotaConfig;
use daybook_db::models::reminder::CreateReminder;
use daybook_db::repositories::{QuotaError, ReminderRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (display_name, email) VALUES ($1, $2) RETURNING id")
        .bind("Ada")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn new_reminder(title: &str) -> CreateReminder {
    CreateReminder {
        title: title.to_string(),
        description: None,
        next_reminder_at: Utc::now() + Days::new(1),
        reminder_type: "daily".to_string(),
    }
}

async fn reminder_count(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM custom_reminders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_at_daily_cap_is_refused_and_writes_no_row(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 2,
        max_active: 25,
    };
    let user_id = new_user(&pool, "daily-cap@example.com").await;

    ReminderRepo::create(&pool, user_id, &new_reminder("one"), &config)
        .await
        .unwrap();
    ReminderRepo::create(&pool, user_id, &new_reminder("two"), &config)
        .await
        .unwrap();

    let refused = ReminderRepo::create(&pool, user_id, &new_reminder("three"), &config).await;
    assert!(matches!(
        refused,
        Err(QuotaError::DailyLimit { created: 2, max: 2 })
    ));
    assert_eq!(reminder_count(&pool, user_id).await, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn create_at_active_cap_is_refused_and_writes_no_row(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 10,
        max_active: 1,
    };
    let user_id = new_user(&pool, "active-cap@example.com").await;

    ReminderRepo::create(&pool, user_id, &new_reminder("one"), &config)
        .await
        .unwrap();

    let refused = ReminderRepo::create(&pool, user_id, &new_reminder("two"), &config).await;
    assert!(matches!(
        refused,
        Err(QuotaError::ActiveLimit { active: 1, max: 1 })
    ));
    assert_eq!(reminder_count(&pool, user_id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn caps_are_per_user(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 1,
        max_active: 25,
    };
    let first = new_user(&pool, "first@example.com").await;
    let second = new_user(&pool, "second@example.com").await;

    ReminderRepo::create(&pool, first, &new_reminder("mine"), &config)
        .await
        .unwrap();

    // The first user's exhausted cap does not touch the second user.
    ReminderRepo::create(&pool, second, &new_reminder("theirs"), &config)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Toggle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn reactivation_at_daily_cap_is_refused(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 2,
        max_active: 25,
    };
    let user_id = new_user(&pool, "toggle-daily@example.com").await;

    let first = ReminderRepo::create(&pool, user_id, &new_reminder("one"), &config)
        .await
        .unwrap();
    ReminderRepo::create(&pool, user_id, &new_reminder("two"), &config)
        .await
        .unwrap();

    // Deactivate, freeing the active cap but not the daily-creation cap.
    let deactivated = ReminderRepo::toggle_active(&pool, user_id, first.id, &config)
        .await
        .unwrap();
    assert!(!deactivated.is_active);

    let refused = ReminderRepo::toggle_active(&pool, user_id, first.id, &config).await;
    assert!(matches!(
        refused,
        Err(QuotaError::DailyLimit { created: 2, max: 2 })
    ));

    let still_inactive: bool =
        sqlx::query_scalar("SELECT is_active FROM custom_reminders WHERE id = $1")
            .bind(first.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!still_inactive);
}

#[sqlx::test(migrations = "./migrations")]
async fn reactivation_at_active_cap_is_refused(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 10,
        max_active: 1,
    };
    let user_id = new_user(&pool, "toggle-active@example.com").await;

    let first = ReminderRepo::create(&pool, user_id, &new_reminder("one"), &config)
        .await
        .unwrap();
    ReminderRepo::toggle_active(&pool, user_id, first.id, &config)
        .await
        .unwrap();
    ReminderRepo::create(&pool, user_id, &new_reminder("two"), &config)
        .await
        .unwrap();

    let refused = ReminderRepo::toggle_active(&pool, user_id, first.id, &config).await;
    assert!(matches!(
        refused,
        Err(QuotaError::ActiveLimit { active: 1, max: 1 })
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn deactivation_succeeds_with_both_caps_exhausted(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 1,
        max_active: 1,
    };
    let user_id = new_user(&pool, "deactivate@example.com").await;

    let reminder = ReminderRepo::create(&pool, user_id, &new_reminder("one"), &config)
        .await
        .unwrap();

    let deactivated = ReminderRepo::toggle_active(&pool, user_id, reminder.id, &config)
        .await
        .unwrap();
    assert!(!deactivated.is_active);
}

#[sqlx::test(migrations = "./migrations")]
async fn toggle_of_foreign_reminder_is_not_found(pool: PgPool) {
    let config = QuotaConfig::default();
    let owner = new_user(&pool, "owner@example.com").await;
    let intruder = new_user(&pool, "intruder@example.com").await;

    let reminder = ReminderRepo::create(&pool, owner, &new_reminder("private"), &config)
        .await
        .unwrap();

    let refused = ReminderRepo::toggle_active(&pool, intruder, reminder.id, &config).await;
    assert!(matches!(refused, Err(QuotaError::NotFound(id)) if id == reminder.id));
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn quota_status_reports_counts_without_side_effects(pool: PgPool) {
    let config = QuotaConfig {
        max_per_day: 10,
        max_active: 25,
    };
    let user_id = new_user(&pool, "status@example.com").await;

    let reminder = ReminderRepo::create(&pool, user_id, &new_reminder("one"), &config)
        .await
        .unwrap();
    ReminderRepo::toggle_active(&pool, user_id, reminder.id, &config)
        .await
        .unwrap();

    let status = ReminderRepo::quota_status(&pool, user_id, &config)
        .await
        .unwrap();
    assert_eq!(status.reminders_created_today, 1);
    assert_eq!(status.active_reminders, 0);
    assert!(status.can_create_more);

    assert_eq!(reminder_count(&pool, user_id).await, 1);
}
