// Shared fakes and fixtures for the report tests.

use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;

use crate::auth::assertion::AssertionSigner;
use crate::auth::exchange::TokenExchanger;
use crate::cache::token::AccessToken;
use crate::cache::token_cache::TokenProvider;
use crate::config::service::{EmailDetail, SummarizerConfig};
use crate::errors::{ClassifiedError, ErrorKind, ReportError};
use crate::sinks::mailer::Mailer;
use crate::sources::{FeedbackItem, FeedbackSource, Summarizer};

pub const TEST_PRIVATE_KEY: &str = include_str!("../../../tests/fixtures/service_account_key.pem");
pub const TEST_PUBLIC_KEY: &str = include_str!("../../../tests/fixtures/service_account_key.pub.pem");

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Address nothing listens on.
pub fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, path)
}

pub fn feedback_item(id: i64, text: &str) -> FeedbackItem {
    FeedbackItem {
        id,
        text: text.to_owned(),
        date: Some(Utc.with_ymd_and_hms(2026, 10, 12, 9, 30, 0).unwrap()),
        filename: format!("feedback-{}.txt", id),
        path: format!("/uploads/feedback-{}.txt", id),
    }
}

pub fn email_detail() -> EmailDetail {
    EmailDetail {
        to: vec!["team@example.com".to_owned(), "lead@example.com".to_owned()],
        from: "noreply@example.com".to_owned(),
        subject: "Weekly feedback report".to_owned(),
    }
}

pub fn summarizer_config(completion_url: String) -> SummarizerConfig {
    SummarizerConfig {
        completion_url,
        folder_id: "b1g-folder".to_owned(),
        model: "yandexgpt-32k/rc".to_owned(),
        instruction: "Summarize the messages and describe their overall tone".to_owned(),
    }
}

/// ================================
/// Credentials
/// ================================
pub struct FixedSigner;

impl AssertionSigner for FixedSigner {
    fn sign(&self, now: DateTime<Utc>) -> Result<String, ReportError> {
        Ok(format!("assertion-{}", now.timestamp()))
    }
}

pub struct FailingSigner;

impl AssertionSigner for FailingSigner {
    fn sign(&self, _now: DateTime<Utc>) -> Result<String, ReportError> {
        Err(ReportError::Signing(ClassifiedError::local("malformed key")))
    }
}

/// Issues `token-<n>` valid for `ttl`, counting exchanges.
#[derive(Clone)]
pub struct CountingExchanger {
    pub calls: Arc<AtomicUsize>,
    pub ttl: chrono::Duration,
    pub delay: Duration,
    pub fail_with: Option<ErrorKind>,
}

impl CountingExchanger {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            ttl,
            delay: Duration::ZERO,
            fail_with: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenExchanger for CountingExchanger {
    async fn exchange(&self, _assertion: &str) -> Result<AccessToken, ReportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(kind) = self.fail_with {
            return Err(ReportError::TokenExchange(ClassifiedError::new(kind, "exchange failed")));
        }
        Ok(AccessToken::new(format!("token-{}", n), Utc::now() + self.ttl))
    }
}

pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    async fn valid_token(&self) -> Result<AccessToken, ReportError> {
        Ok(AccessToken::new(self.0.to_owned(), Utc::now() + chrono::Duration::hours(12)))
    }
}

/// ================================
/// Collaborators
/// ================================
#[derive(Clone, Default)]
pub struct StaticFeedback {
    pub items: Vec<FeedbackItem>,
    pub windows: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>>,
}

impl StaticFeedback {
    pub fn new(items: Vec<FeedbackItem>) -> Self {
        Self { items, windows: Arc::default() }
    }
}

impl FeedbackSource for StaticFeedback {
    async fn fetch_feedback(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FeedbackItem>, ReportError> {
        self.windows.lock().unwrap().push((from, to));
        Ok(self.items.clone())
    }
}

#[derive(Clone, Default)]
pub struct RecordingSummarizer {
    pub reply: String,
    pub delay: Duration,
    pub inputs: Arc<Mutex<Vec<String>>>,
}

impl RecordingSummarizer {
    pub fn new(reply: &str) -> Self {
        Self { reply: reply.to_owned(), ..Default::default() }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, ReportError> {
        self.inputs.lock().unwrap().push(text.to_owned());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    pub fail_with: Option<ErrorKind>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send_mail(
        &self,
        to: &[String],
        from: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), ReportError> {
        if let Some(kind) = self.fail_with {
            return Err(ReportError::MailDelivery(ClassifiedError::new(kind, "smtp down")));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_vec(),
            from: from.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}
