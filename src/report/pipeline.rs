use std::error::Error;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::service::EmailDetail;
use crate::errors::ReportError;
use crate::helpers::time::{get_instant, report_window};
use crate::observability::metrics::get_metrics;
use crate::sinks::mailer::Mailer;
use crate::sources::{FeedbackItem, FeedbackSource, Summarizer};
use crate::utils::constants::FEEDBACK_SEPARATOR;

/// How a triggered run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// the window held no feedback, nothing was sent
    NoFeedback,
    Sent { items: usize },
    /// another run was still in flight
    Skipped,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::NoFeedback => "no_feedback",
            RunOutcome::Sent { .. } => "sent",
            RunOutcome::Skipped => "skipped",
        }
    }
}

/// fetch -> summarize -> mail, strictly sequential, no retries.
pub struct ReportPipeline<F, S, M> {
    feedback: F,
    summarizer: S,
    mailer: M,
    email: EmailDetail,
    run_guard: Mutex<()>,
}

impl<F, S, M> ReportPipeline<F, S, M>
where
    F: FeedbackSource,
    S: Summarizer,
    M: Mailer,
{
    pub fn new(feedback: F, summarizer: S, mailer: M, email: EmailDetail) -> Self {
        Self {
            feedback,
            summarizer,
            mailer,
            email,
            run_guard: Mutex::new(()),
        }
    }

    /// Entry point of one scheduled trigger.
    ///
    /// Every failure is logged here with its classified context and returned;
    /// nothing is retried and no partial mail is sent. A trigger that arrives while
    /// a run is in flight is skipped.
    pub async fn run_weekly_report(&self) -> Result<RunOutcome, ReportError> {
        let metrics = get_metrics().await;
        let Ok(_running) = self.run_guard.try_lock() else {
            warn!("weekly report is already running, trigger skipped");
            metrics.report_runs.with_label_values(&[RunOutcome::Skipped.as_str()]).inc();
            return Ok(RunOutcome::Skipped);
        };

        let start = get_instant();
        info!("weekly report started");
        let result = self.execute(Utc::now()).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(outcome) => {
                info!(outcome = outcome.as_str(), elapsed_secs = elapsed, "weekly report finished");
                metrics.report_runs.with_label_values(&[outcome.as_str()]).inc();
                metrics.report_duration.with_label_values(&[outcome.as_str()]).observe(elapsed);
            }
            Err(err) => {
                let classified = err.classified();
                error!(
                    boundary = err.boundary(),
                    kind = %classified.kind,
                    status = ?classified.status,
                    cause = %cause_chain(err),
                    elapsed_secs = elapsed,
                    "weekly report aborted: {}",
                    err
                );
                metrics.report_runs.with_label_values(&["failed"]).inc();
                metrics.report_failures.with_label_values(&[err.boundary(), classified.kind.as_str()]).inc();
                metrics.report_duration.with_label_values(&["failed"]).observe(elapsed);
            }
        }
        result
    }

    async fn execute(&self, now: DateTime<Utc>) -> Result<RunOutcome, ReportError> {
        let (from, to) = report_window(now);
        let items = self.feedback.fetch_feedback(from, to).await?;
        if items.is_empty() {
            info!(%from, %to, "no feedback in window, nothing to send");
            return Ok(RunOutcome::NoFeedback);
        }

        let document = concat_feedback(&items);
        let summary = self.summarizer.summarize(&document).await?;

        self.mailer
            .send_mail(&self.email.to, &self.email.from, &self.email.subject, &summary)
            .await?;
        Ok(RunOutcome::Sent { items: items.len() })
    }
}

/// Every text followed by a blank line, in source order.
pub fn concat_feedback(items: &[FeedbackItem]) -> String {
    items.iter().fold(String::new(), |mut document, item| {
        document.push_str(&item.text);
        document.push_str(FEEDBACK_SEPARATOR);
        document
    })
}

fn cause_chain(err: &ReportError) -> String {
    let mut causes = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes.join(" <- ")
}
