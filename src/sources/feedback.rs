use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Deserializer};
use tracing::{error, info};

use crate::auth::feedback_jwt::FeedbackJwtSigner;
use crate::errors::{classify, RawFailure, ReportError};
use crate::helpers::http::{parse_json, send_and_read};
use crate::sources::FeedbackSource;
use crate::utils::constants::{DEFAULT_FEEDBACK_TIMEOUT_SECS, FEEDBACK_PATH};

/// One feedback record as served by the feedback API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackItem {
    #[serde(deserialize_with = "number_or_string")]
    pub id: i64,
    pub text: String,
    /// creation time; `None` when missing or unreadable, it never fails the batch
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub filename: String,
    #[serde(default, rename = "pathOfFile", alias = "path")]
    pub path: String,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(id) => Ok(id),
        Id::Text(id) => id.trim().parse().map_err(serde::de::Error::custom),
    }
}

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_str).and_then(parse_date))
}

/// RFC 3339 first, then naive date-time or plain date read as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|date| date.and_utc())
}

/// Feedback API client, authenticated with a shared-secret JWT.
#[derive(Clone)]
pub struct FeedbackApiClient {
    client: Client,
    base_url: String,
    signer: FeedbackJwtSigner,
    timeout: Duration,
}

impl FeedbackApiClient {
    pub fn new(client: Client, base_url: String, signer: FeedbackJwtSigner) -> Self {
        Self {
            client,
            base_url,
            signer,
            timeout: Duration::from_secs(DEFAULT_FEEDBACK_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), FEEDBACK_PATH)
    }
}

impl FeedbackSource for FeedbackApiClient {
    async fn fetch_feedback(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FeedbackItem>, ReportError> {
        let endpoint = self.endpoint();
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("from", from.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ("to", to.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ],
        )
        .map_err(|err| {
            ReportError::FeedbackFetch(classify(&endpoint, RawFailure::Local(Box::new(err))))
        })?;

        let token = self.signer.sign(Utc::now()).map_err(ReportError::FeedbackFetch)?;

        let request = self
            .client
            .get(url)
            .bearer_auth(token)
            .timeout(self.timeout);

        let fetched = match send_and_read(request, &endpoint).await {
            Ok((status, body)) => parse_json::<Vec<FeedbackItem>>(&endpoint, status, &body),
            Err(err) => Err(err),
        };

        match fetched {
            Ok(items) => {
                info!(endpoint = %endpoint, %from, %to, items = items.len(), "feedback fetched");
                Ok(items)
            }
            Err(err) => {
                error!(endpoint = %endpoint, kind = %err.kind, status = ?err.status, "feedback fetch failed: {}", err.message);
                Err(ReportError::FeedbackFetch(err))
            }
        }
    }
}
