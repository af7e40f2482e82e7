use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::cache::token::AccessToken;
use crate::errors::ReportError;
use crate::helpers::http::{parse_json, send_and_read};
use crate::helpers::time::get_instant;
use crate::utils::constants::TOKEN_EXCHANGE_TIMEOUT_SECS;

/// Trades a signed assertion for an access token.
pub trait TokenExchanger: Send + Sync {
    fn exchange(
        &self,
        assertion: &str,
    ) -> impl Future<Output = Result<AccessToken, ReportError>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IamTokenResponse {
    iam_token: String,
    expires_at: DateTime<Utc>,
}

/// Exchanges assertions at the IAM `tokens` endpoint. Never retries.
#[derive(Debug, Clone)]
pub struct IamTokenExchanger {
    client: Client,
    token_url: String,
    timeout: Duration,
}

impl IamTokenExchanger {
    pub fn new(client: Client, token_url: String) -> Self {
        Self {
            client,
            token_url,
            timeout: Duration::from_secs(TOKEN_EXCHANGE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

impl TokenExchanger for IamTokenExchanger {
    async fn exchange(&self, assertion: &str) -> Result<AccessToken, ReportError> {
        let start = get_instant();
        let request = self
            .client
            .post(&self.token_url)
            .timeout(self.timeout)
            .json(&json!({ "jwt": assertion }));

        let exchanged = match send_and_read(request, &self.token_url).await {
            Ok((status, body)) => parse_json::<IamTokenResponse>(&self.token_url, status, &body),
            Err(err) => Err(err),
        };

        match exchanged {
            Ok(response) => {
                info!(
                    url = %self.token_url,
                    expires_at = %response.expires_at,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "access token issued"
                );
                Ok(AccessToken::new(response.iam_token, response.expires_at))
            }
            Err(err) => {
                error!(url = %self.token_url, kind = %err.kind, status = ?err.status, "token exchange failed: {}", err.message);
                Err(ReportError::TokenExchange(err))
            }
        }
    }
}
