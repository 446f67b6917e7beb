//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod notification_job_repo;
pub mod preference_repo;
pub mod reminder_repo;
pub mod streak_repo;
pub mod user_repo;

pub use notification_job_repo::NotificationJobRepo;
pub use preference_repo::PreferenceRepo;
pub use reminder_repo::{QuotaError, ReminderRepo};
pub use streak_repo::StreakRepo;
pub use user_repo::UserRepo;
