//! One-shot dispatch runner for cron.
//!
//! Runs a single queue-consumer invocation against the configured database
//! and SMTP relay, logs the batch summary, and exits. Exit code 1 means the
//! batch could not be fetched at all (no job was touched); per-job failures
//! are recorded on the rows and reported in the summary.

use std::process::ExitCode;

use daybook_notify::{QueueConsumer, SmtpConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// `APP_URL` fallback when unset.
const DEFAULT_APP_URL: &str = "http://localhost:5173";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daybook_dispatch=info,daybook_notify=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(smtp) = SmtpConfig::from_env() else {
        tracing::error!("SMTP_HOST not set; nothing to dispatch");
        return ExitCode::FAILURE;
    };

    let app_url = std::env::var("APP_URL")
        .unwrap_or_else(|_| DEFAULT_APP_URL.into())
        .trim_end_matches('/')
        .to_string();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = daybook_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    let consumer = QueueConsumer::new(pool, smtp, app_url);
    match consumer.run_once().await {
        Ok(summary) => {
            tracing::info!(
                processed = summary.processed,
                successful = summary.successful,
                failed = summary.failed,
                skipped = summary.skipped,
                "Dispatch complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job batch");
            ExitCode::FAILURE
        }
    }
}
