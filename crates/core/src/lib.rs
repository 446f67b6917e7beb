//! Pure domain logic for the Daybook notification core.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the delivery pipeline, and any future CLI tooling:
//!
//! - [`streak`] — current/longest streak computation and the milestone table.
//! - [`templates`] — notification email rendering (subject + inline-styled HTML).
//! - [`quota`] — custom-reminder quota configuration and derived status.
//! - [`error`] — the shared [`CoreError`](error::CoreError) taxonomy.
//! - [`types`] — `DbId` / `Timestamp` aliases used across the workspace.

pub mod error;
pub mod quota;
pub mod streak;
pub mod templates;
pub mod types;

pub use error::CoreError;
pub use quota::{QuotaConfig, RateLimitStatus};
pub use streak::{compute_streaks, milestone_for, Milestone, StreakStats};
pub use templates::{EmailContext, EmailKind, PromptPicker, RenderedEmail};
