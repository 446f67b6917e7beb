//! Queue consumer: the single-shot batch processor for due notification jobs.
//!
//! On each trigger the consumer atomically claims up to [`BATCH_LIMIT`] due
//! `pending` jobs (moving them to `processing`), then processes the claimed
//! jobs concurrently. Each job independently looks up the user's preferences,
//! streak snapshot, and profile, renders the matching template, and attempts
//! delivery over the shared SMTP session. Outcomes are written per job:
//!
//! - `sent` — delivery succeeded
//! - `skipped` — the user opted out; the transport is never invoked
//! - `failed` — lookup or delivery error, message captured verbatim
//! - released to `pending` — the per-job timeout elapsed
//!
//! No job's error ever crosses its own boundary; only a failure of the claim
//! query itself aborts the invocation.

use std::time::Duration;

use chrono::Utc;
use daybook_core::templates::{self, EmailContext, EmailKind, RandomPromptPicker};
use daybook_db::models::job::{JobStatus, NotificationJob};
use daybook_db::repositories::{NotificationJobRepo, PreferenceRepo, StreakRepo, UserRepo};
use daybook_db::DbPool;
use serde::Serialize;

use crate::mailer::{Mailer, SmtpConfig};

/// Maximum jobs claimed per invocation.
pub const BATCH_LIMIT: i64 = 50;

/// Default per-job processing timeout.
const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Terminal record for one processed job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub job_id: i64,
    pub user_id: i64,
    pub job_type: String,
    /// Final status wire name; `"pending"` for jobs released after a timeout.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one consumer invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<JobOutcome>,
}

/// Fold per-job outcomes into the aggregate summary.
///
/// Timed-out jobs were released back to `pending`; they count as failures of
/// this invocation even though they will be retried by the next one.
fn summarize(results: Vec<JobOutcome>) -> BatchSummary {
    let successful = results
        .iter()
        .filter(|o| o.status == JobStatus::Sent.as_str())
        .count();
    let skipped = results
        .iter()
        .filter(|o| o.status == JobStatus::Skipped.as_str())
        .count();
    BatchSummary {
        processed: results.len(),
        successful,
        skipped,
        failed: results.len() - successful - skipped,
        results,
    }
}

// ---------------------------------------------------------------------------
// QueueConsumer
// ---------------------------------------------------------------------------

/// Single-shot processor for due notification jobs.
///
/// Stateless across invocations; all shared mutable state lives in the job
/// table, whose only mutation is a single-row status update keyed by id.
pub struct QueueConsumer {
    pool: DbPool,
    smtp: SmtpConfig,
    /// Base URL interpolated into email CTAs, without trailing slash.
    app_url: String,
    job_timeout: Duration,
}

impl QueueConsumer {
    /// Create a consumer over the given pool and SMTP configuration.
    pub fn new(pool: DbPool, smtp: SmtpConfig, app_url: impl Into<String>) -> Self {
        Self {
            pool,
            smtp,
            app_url: app_url.into(),
            job_timeout: DEFAULT_JOB_TIMEOUT,
        }
    }

    /// Override the per-job timeout (mainly for tests).
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Process one batch of due jobs and return the aggregate summary.
    ///
    /// The claim query is the only operation whose failure aborts the whole
    /// invocation; at that point no job has been touched.
    pub async fn run_once(&self) -> Result<BatchSummary, sqlx::Error> {
        let jobs = NotificationJobRepo::claim_due_batch(&self.pool, Utc::now(), BATCH_LIMIT)
            .await?;

        if jobs.is_empty() {
            tracing::debug!("No due notification jobs");
            return Ok(summarize(Vec::new()));
        }

        tracing::info!(claimed = jobs.len(), "Claimed notification job batch");

        // One transport per invocation, shared by every job in the batch. If
        // it cannot be constructed, each claimed job is failed with that
        // message rather than silently released.
        let mailer = match Mailer::connect(&self.smtp) {
            Ok(mailer) => mailer,
            Err(e) => {
                let message = e.to_string();
                let mut results = Vec::with_capacity(jobs.len());
                for job in &jobs {
                    results.push(self.record_failed(job, message.clone()).await);
                }
                return Ok(summarize(results));
            }
        };

        let tasks = jobs
            .iter()
            .map(|job| self.process_with_timeout(&mailer, job));
        let results = futures::future::join_all(tasks).await;

        let summary = summarize(results);
        tracing::info!(
            processed = summary.processed,
            successful = summary.successful,
            failed = summary.failed,
            skipped = summary.skipped,
            "Notification batch complete"
        );
        Ok(summary)
    }

    /// Run one job under the per-job timeout.
    ///
    /// A timed-out job is released back to `pending` so a stuck lookup or
    /// send cannot stall the batch; the next trigger picks it up again.
    async fn process_with_timeout(&self, mailer: &Mailer, job: &NotificationJob) -> JobOutcome {
        match tokio::time::timeout(self.job_timeout, self.process_job(mailer, job)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let message = format!(
                    "processing timed out after {}s; released for retry",
                    self.job_timeout.as_secs()
                );
                tracing::warn!(job_id = job.id, %message, "Job timed out");
                if let Err(e) = NotificationJobRepo::release(&self.pool, job.id).await {
                    tracing::error!(job_id = job.id, error = %e, "Failed to release timed-out job");
                }
                JobOutcome {
                    job_id: job.id,
                    user_id: job.user_id,
                    job_type: job.job_type.clone(),
                    status: JobStatus::Pending.as_str(),
                    error: Some(message),
                }
            }
        }
    }

    /// Process a single claimed job end to end. Never returns an error: every
    /// failure mode is recorded on the row and reflected in the outcome.
    async fn process_job(&self, mailer: &Mailer, job: &NotificationJob) -> JobOutcome {
        // 1. Preference gate. A missing row is treated as opted out.
        let preference = match PreferenceRepo::find_by_user(&self.pool, job.user_id).await {
            Ok(pref) => pref,
            Err(e) => return self.record_failed(job, format!("preference lookup: {e}")).await,
        };

        let allowed = preference.as_ref().is_some_and(|p| p.allows(&job.job_type));
        if !allowed {
            let reason = match preference {
                Some(_) => format!("user disabled {} emails", job.job_type),
                None => "no notification preferences on file; treated as opted out".to_string(),
            };
            return self.record_skipped(job, reason).await;
        }

        // 2. Context: profile name plus streak snapshot (zeros when absent).
        let user = match UserRepo::find_by_id(&self.pool, job.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return self
                    .record_failed(job, format!("user {} not found", job.user_id))
                    .await
            }
            Err(e) => return self.record_failed(job, format!("profile lookup: {e}")).await,
        };

        let snapshot = match StreakRepo::find_by_user(&self.pool, job.user_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => return self.record_failed(job, format!("streak lookup: {e}")).await,
        };
        let (current_streak, total_entries) = snapshot
            .map(|s| (s.current_streak.max(0) as u32, s.total_entries.max(0) as u32))
            .unwrap_or((0, 0));

        // 3. Render.
        let Some(kind) = EmailKind::parse(&job.job_type) else {
            return self
                .record_failed(job, format!("unknown job type: {}", job.job_type))
                .await;
        };
        let ctx = EmailContext {
            display_name: user.display_name,
            current_streak,
            total_entries,
            app_url: self.app_url.clone(),
        };
        let email = templates::render(kind, &ctx, &mut RandomPromptPicker);

        // 4. Deliver.
        if let Err(e) = mailer.send(&job.email, &email.subject, &email.html).await {
            return self.record_failed(job, e.to_string()).await;
        }

        if let Err(e) = NotificationJobRepo::mark_sent(&self.pool, job.id).await {
            // The email went out but the status write failed; surface this as
            // a failure so an operator investigates the row.
            tracing::error!(job_id = job.id, error = %e, "Failed to mark job sent");
            return JobOutcome {
                job_id: job.id,
                user_id: job.user_id,
                job_type: job.job_type.clone(),
                status: JobStatus::Failed.as_str(),
                error: Some(format!("delivered but status write failed: {e}")),
            };
        }

        tracing::info!(job_id = job.id, user_id = job.user_id, job_type = %job.job_type, "Job sent");
        JobOutcome {
            job_id: job.id,
            user_id: job.user_id,
            job_type: job.job_type.clone(),
            status: JobStatus::Sent.as_str(),
            error: None,
        }
    }

    /// Record a terminal failure, capturing the message verbatim.
    async fn record_failed(&self, job: &NotificationJob, message: String) -> JobOutcome {
        tracing::warn!(job_id = job.id, error = %message, "Job failed");
        if let Err(e) = NotificationJobRepo::mark_failed(&self.pool, job.id, &message).await {
            tracing::error!(job_id = job.id, error = %e, "Failed to record job failure");
        }
        JobOutcome {
            job_id: job.id,
            user_id: job.user_id,
            job_type: job.job_type.clone(),
            status: JobStatus::Failed.as_str(),
            error: Some(message),
        }
    }

    /// Record a preference opt-out, distinct from failure.
    async fn record_skipped(&self, job: &NotificationJob, reason: String) -> JobOutcome {
        tracing::debug!(job_id = job.id, %reason, "Job skipped");
        if let Err(e) = NotificationJobRepo::mark_skipped(&self.pool, job.id, &reason).await {
            tracing::error!(job_id = job.id, error = %e, "Failed to record job skip");
        }
        JobOutcome {
            job_id: job.id,
            user_id: job.user_id,
            job_type: job.job_type.clone(),
            status: JobStatus::Skipped.as_str(),
            error: Some(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: &'static str) -> JobOutcome {
        JobOutcome {
            job_id: 1,
            user_id: 1,
            job_type: "daily_reminder".to_string(),
            status,
            error: None,
        }
    }

    #[test]
    fn empty_batch_summarizes_to_zeroes() {
        let summary = summarize(Vec::new());
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 0);
        assert!(summary.results.is_empty());
    }

    #[test]
    fn summary_separates_sent_failed_and_skipped() {
        let summary = summarize(vec![
            outcome("sent"),
            outcome("sent"),
            outcome("failed"),
            outcome("skipped"),
        ]);
        assert_eq!(summary.processed, 4);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn released_jobs_count_as_failures_of_this_invocation() {
        let summary = summarize(vec![outcome("pending"), outcome("sent")]);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.successful, 1);
    }

    #[test]
    fn outcome_error_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(outcome("sent")).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["status"], "sent");
    }
}
