//! # Feedback Digest Library
//!
//! Weekly job that fetches customer feedback, summarizes it through an LLM
//! completion endpoint and mails the summary. Outbound calls to the LLM are
//! authenticated with a short-lived IAM token obtained by exchanging a signed
//! service-account assertion; the token is cached until it nears expiry.
//!
//! Modules:
//! - `auth`: assertion signing, IAM token exchange, feedback API token
//! - `cache`: single-flight access token cache
//! - `errors`: three-kind failure classification shared by every boundary
//! - `sources`: feedback API and completion API clients
//! - `sinks`: SMTP mail delivery
//! - `report`: the weekly pipeline and its scheduler
//! - `config`: YAML configuration, defaults and validation

pub mod auth;
pub mod cache;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod report;
pub mod server;
pub mod sinks;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;


pub use crate::config::service::ServiceConfig;
pub use crate::errors::{ClassifiedError, ErrorKind, ReportError};
