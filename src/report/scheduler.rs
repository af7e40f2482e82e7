use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, Utc, Weekday};
use tracing::{debug, info};

use crate::config::settings::ScheduleConfig;
use crate::report::pipeline::ReportPipeline;
use crate::sinks::mailer::Mailer;
use crate::sources::{FeedbackSource, Summarizer};

/// Fixed weekly trigger: one weekday at one UTC time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekday: Weekday,
    at: NaiveTime,
}

impl WeeklySchedule {
    pub fn new(weekday: Weekday, hour: u32, minute: u32) -> Result<Self> {
        let at = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| anyhow!("invalid schedule time {:02}:{:02}", hour, minute))?;
        Ok(Self { weekday, at })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(config.weekday, config.hour, config.minute)
    }

    /// First trigger strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - today.weekday().num_days_from_monday())
            % 7;
        let candidate = (today + TimeDelta::days(days_ahead as i64))
            .and_time(self.at)
            .and_utc();

        if candidate > now {
            candidate
        } else {
            candidate + TimeDelta::days(7)
        }
    }
}

/// Sleep until each trigger and run the report; a run always finishes before the
/// next sleep is computed, so runs never overlap.
pub async fn run_weekly<F, S, M>(
    schedule: WeeklySchedule,
    pipeline: Arc<ReportPipeline<F, S, M>>,
) -> Result<()>
where
    F: FeedbackSource,
    S: Summarizer,
    M: Mailer,
{
    loop {
        let now = Utc::now();
        let next = schedule.next_after(now);
        let sleep_for = (next - now).to_std().unwrap_or(Duration::from_secs(1));
        info!(next_run = %next, sleep_secs = sleep_for.as_secs(), "waiting for next weekly report");
        tokio::time::sleep(sleep_for).await;

        match pipeline.run_weekly_report().await {
            Ok(outcome) => debug!(outcome = outcome.as_str(), "weekly trigger handled"),
            // already logged with full context by the pipeline
            Err(err) => debug!(
                boundary = err.boundary(),
                "run ended with error; next attempt at next trigger"
            ),
        }
    }
}
