//! Inputs of the weekly report: the feedback API and the completion API.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::errors::ReportError;

pub mod completion;
pub mod feedback;

pub use feedback::FeedbackItem;

/// Returns feedback records created inside `[from, to]`, in source order.
pub trait FeedbackSource: Send + Sync {
    fn fetch_feedback(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<FeedbackItem>, ReportError>> + Send;
}

/// Turns a document into a summary.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> impl Future<Output = Result<String, ReportError>> + Send;
}
