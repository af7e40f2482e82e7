use std::error::Error;
use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Kind of an external failure, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// the remote answered with a non-success status or an unusable payload
    RemoteRejected,
    /// the request went out but no response came back
    RemoteUnreachable,
    /// nothing was sent: bad input, key material, local exception
    LocalFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::RemoteRejected => "remote_rejected",
            ErrorKind::RemoteUnreachable => "remote_unreachable",
            ErrorKind::LocalFailure => "local_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external failure normalized into one of the three kinds.
#[derive(Debug)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status when the remote answered
    pub status: Option<u16>,
    pub cause: Option<Box<dyn Error + Send + Sync>>,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), status: None, cause: None }
    }

    pub fn local(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LocalFailure, message)
    }

    pub fn rejected(message: impl Into<String>, status: Option<u16>) -> Self {
        Self { status, ..Self::new(ErrorKind::RemoteRejected, message) }
    }

    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for ClassifiedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

/// Raw outcome of a failed outbound call, before classification.
#[derive(Debug)]
pub enum RawFailure {
    /// The remote responded with a non-success status.
    Status { status: StatusCode, body: String },
    /// The client failed while building, sending or reading the request.
    Transport(reqwest::Error),
    /// The remote responded with success but the payload is unusable.
    Payload { status: StatusCode, reason: String },
    /// The call was abandoned before any request was built.
    Local(Box<dyn Error + Send + Sync>),
}

/// Map a raw failure at `endpoint` into a [`ClassifiedError`].
pub fn classify(endpoint: &str, raw: RawFailure) -> ClassifiedError {
    match raw {
        RawFailure::Status { status, body } => {
            let message = match remote_message(&body) {
                Some(remote) => format!(
                    "failed to get data from {} because server returned status code {} with message {}",
                    endpoint,
                    status.as_u16(),
                    remote
                ),
                None => format!(
                    "failed to get data from {} because server returned status code {}",
                    endpoint,
                    status.as_u16()
                ),
            };
            ClassifiedError::rejected(message, Some(status.as_u16()))
        }
        RawFailure::Payload { status, reason } => ClassifiedError::rejected(
            format!("unusable response from {}: {}", endpoint, reason),
            Some(status.as_u16()),
        ),
        RawFailure::Transport(err) => classify_transport(endpoint, err),
        RawFailure::Local(err) => ClassifiedError {
            kind: ErrorKind::LocalFailure,
            message: format!("request to {} was not attempted: {}", endpoint, err),
            status: None,
            cause: Some(err),
        },
    }
}

fn classify_transport(endpoint: &str, err: reqwest::Error) -> ClassifiedError {
    if err.is_builder() {
        return ClassifiedError::local(format!(
            "request to {} was not attempted: {}",
            endpoint, err
        ))
        .with_cause(err);
    }
    if let Some(status) = err.status() {
        return ClassifiedError::rejected(
            format!(
                "failed to get data from {} because server returned status code {}",
                endpoint,
                status.as_u16()
            ),
            Some(status.as_u16()),
        )
        .with_cause(err);
    }
    let reason = if err.is_timeout() { "timed out" } else { "is not responding" };
    ClassifiedError::new(
        ErrorKind::RemoteUnreachable,
        format!("failed to get data from {} because server {}", endpoint, reason),
    )
    .with_cause(err)
}

/// Structured error message carried by a JSON error body, if any.
pub fn remote_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["/message", "/error/message", "/error"]
        .iter()
        .filter_map(|pointer| json.pointer(pointer))
        .find_map(|v| v.as_str().map(str::to_owned))
}

/// Failure of one boundary of the weekly report, wrapping exactly one classified cause.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("signing assertion failed: {0}")]
    Signing(#[source] ClassifiedError),
    #[error("token exchange failed: {0}")]
    TokenExchange(#[source] ClassifiedError),
    #[error("feedback fetch failed: {0}")]
    FeedbackFetch(#[source] ClassifiedError),
    #[error("summarization failed: {0}")]
    Summarization(#[source] ClassifiedError),
    #[error("mail delivery failed: {0}")]
    MailDelivery(#[source] ClassifiedError),
}

impl ReportError {
    pub fn classified(&self) -> &ClassifiedError {
        match self {
            ReportError::Signing(e)
            | ReportError::TokenExchange(e)
            | ReportError::FeedbackFetch(e)
            | ReportError::Summarization(e)
            | ReportError::MailDelivery(e) => e,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.classified().kind
    }

    /// Metrics/log label of the failing boundary.
    pub fn boundary(&self) -> &'static str {
        match self {
            ReportError::Signing(_) => "signing",
            ReportError::TokenExchange(_) => "token_exchange",
            ReportError::FeedbackFetch(_) => "feedback_fetch",
            ReportError::Summarization(_) => "summarization",
            ReportError::MailDelivery(_) => "mail_delivery",
        }
    }
}
