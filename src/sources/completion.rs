use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::cache::token_cache::TokenProvider;
use crate::config::service::SummarizerConfig;
use crate::errors::{ClassifiedError, ReportError};
use crate::helpers::http::{parse_json, send_and_read};
use crate::sources::Summarizer;
use crate::utils::constants::{
    ALTERNATIVE_STATUS_CONTENT_FILTER, COMPLETION_MAX_TOKENS, COMPLETION_TEMPERATURE,
    DEFAULT_SUMMARIZER_TIMEOUT_SECS,
};

/// ================================
/// Wire format
/// ================================
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest<'a> {
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: [CompletionMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub stream: bool,
    pub temperature: f64,
    pub max_tokens: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CompletionMessage<'a> {
    pub role: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Debug, Deserialize)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: AlternativeMessage,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct AlternativeMessage {
    text: String,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(config: &'a SummarizerConfig, text: &'a str) -> Self {
        Self {
            model_uri: config.model_uri(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: COMPLETION_TEMPERATURE,
                max_tokens: COMPLETION_MAX_TOKENS,
            },
            messages: [
                CompletionMessage { role: "system", text: &config.instruction },
                CompletionMessage { role: "user", text },
            ],
        }
    }
}

/// LLM completion client. Every call carries a bearer IAM token from `tokens`.
pub struct CompletionClient<P> {
    client: Client,
    config: SummarizerConfig,
    tokens: Arc<P>,
    timeout: Duration,
}

impl<P: TokenProvider> CompletionClient<P> {
    pub fn new(client: Client, config: SummarizerConfig, tokens: Arc<P>) -> Self {
        Self {
            client,
            config,
            tokens,
            timeout: Duration::from_secs(DEFAULT_SUMMARIZER_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<P: TokenProvider> Summarizer for CompletionClient<P> {
    async fn summarize(&self, text: &str) -> Result<String, ReportError> {
        // token failures keep their own boundary (signing / token exchange)
        let token = self.tokens.valid_token().await?;

        let endpoint = self.config.completion_url.as_str();
        let request = self
            .client
            .post(endpoint)
            .bearer_auth(&token.value)
            .header("x-folder-id", &self.config.folder_id)
            .timeout(self.timeout)
            .json(&CompletionRequest::new(&self.config, text));

        let completed = match send_and_read(request, endpoint).await {
            Ok((status, body)) => parse_json::<CompletionResponse>(endpoint, status, &body)
                .and_then(|response| best_alternative(response, status.as_u16())),
            Err(err) => Err(err),
        };

        match completed {
            Ok(summary) => {
                info!(
                    model = %self.config.model,
                    input_len = text.len(),
                    summary_len = summary.len(),
                    "summary generated"
                );
                Ok(summary)
            }
            Err(err) => {
                error!(endpoint, kind = %err.kind, status = ?err.status, "summarization failed: {}", err.message);
                Err(ReportError::Summarization(err))
            }
        }
    }
}

/// The first alternative is the best candidate; a filtered one is not a usable result.
fn best_alternative(response: CompletionResponse, status: u16) -> Result<String, ClassifiedError> {
    let best = response
        .result
        .alternatives
        .into_iter()
        .next()
        .ok_or_else(|| ClassifiedError::rejected("completion returned no alternatives", Some(status)))?;

    if best.status.trim() == ALTERNATIVE_STATUS_CONTENT_FILTER {
        warn!(status = %best.status, "completion alternative was content filtered");
        return Err(ClassifiedError::rejected(
            "generation was stopped due to potentially sensitive content in the prompt or generated response",
            Some(status),
        ));
    }
    Ok(best.message.text)
}
