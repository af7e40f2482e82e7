//! Outputs of the weekly report.

pub mod mailer;
