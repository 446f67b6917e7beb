use std::sync::Arc;

use daybook_core::quota::QuotaConfig;
use daybook_notify::SmtpConfig;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: daybook_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Reminder quota ceilings.
    pub quota: QuotaConfig,
    /// SMTP configuration; `None` when `SMTP_HOST` is unset, in which case
    /// the dispatch endpoint reports 503 instead of failing every job.
    pub smtp: Option<SmtpConfig>,
}
