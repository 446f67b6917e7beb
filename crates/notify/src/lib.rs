//! Scheduled notification delivery pipeline.
//!
//! This crate turns due rows in the `notification_jobs` table into emails:
//!
//! - [`SmtpConfig`] / [`Mailer`] — authenticated STARTTLS session to the
//!   mail relay, constructed once per invocation and shared by the batch.
//! - [`QueueConsumer`] — claims a bounded batch of due jobs, processes them
//!   concurrently with per-job failure isolation, and records a terminal
//!   outcome for each.
//!
//! The consumer is single-shot: an external trigger (cron hitting the API,
//! or the `daybook-dispatch` binary) calls [`QueueConsumer::run_once`] and
//! receives a [`BatchSummary`]. Unprocessed rows simply stay `pending` for
//! the next trigger.

pub mod consumer;
pub mod mailer;

pub use consumer::{BatchSummary, JobOutcome, QueueConsumer};
pub use mailer::{MailError, Mailer, SmtpConfig};
