use std::future::Future;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::assertion::AssertionSigner;
use crate::auth::exchange::TokenExchanger;
use crate::cache::token::AccessToken;
use crate::errors::{ClassifiedError, ReportError};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::TOKEN_SAFETY_MARGIN_SECS;

/// Anything that can hand out a currently valid bearer token.
pub trait TokenProvider: Send + Sync {
    fn valid_token(&self) -> impl Future<Output = Result<AccessToken, ReportError>> + Send;
}

/// Holds at most one access token and refreshes it when it enters the safety margin.
///
/// The lock is held across the stale check, signing and exchange, so concurrent
/// callers that observe a stale token share a single exchange.
pub struct TokenCache<S, E> {
    signer: S,
    exchanger: E,
    safety_margin: Duration,
    current: Mutex<Option<AccessToken>>,
}

impl<S, E> TokenCache<S, E>
where
    S: AssertionSigner,
    E: TokenExchanger,
{
    pub fn new(signer: S, exchanger: E) -> Self {
        Self {
            signer,
            exchanger,
            safety_margin: Duration::seconds(TOKEN_SAFETY_MARGIN_SECS),
            current: Mutex::new(None),
        }
    }

    pub fn with_safety_margin(mut self, safety_margin: Duration) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// Return the cached token, or sign + exchange a new one if absent or stale.
    pub async fn get_valid_token(&self) -> Result<AccessToken, ReportError> {
        let metrics = get_metrics().await;
        let mut current = self.current.lock().await;

        let now = Utc::now();
        if let Some(token) = current
            .as_ref()
            .filter(|token| token.is_usable_at(now, self.safety_margin))
        {
            debug!(
                expires_at = %token.expires_at,
                remaining_secs = token.remaining(now, self.safety_margin).num_seconds(),
                "access token cache hit"
            );
            metrics.token_cache_hits.inc();
            return Ok(token.clone());
        }

        info!(cached = current.is_some(), "access token absent or stale, refreshing");
        let assertion = self.signer.sign(now)?;
        metrics.token_exchanges.inc();
        let token = self.exchanger.exchange(&assertion).await?;

        // the freshly issued token has to satisfy the same bound as a cached one
        let now = Utc::now();
        if !token.is_usable_at(now, self.safety_margin) {
            warn!(
                expires_at = %token.expires_at,
                safety_margin_secs = self.safety_margin.num_seconds(),
                "issued access token expires inside the safety margin"
            );
            return Err(ReportError::TokenExchange(ClassifiedError::rejected(
                format!(
                    "issued access token expires at {}, inside the {}s safety margin",
                    token.expires_at,
                    self.safety_margin.num_seconds()
                ),
                None,
            )));
        }

        info!(expires_at = %token.expires_at, "access token refreshed");
        *current = Some(token.clone());
        Ok(token)
    }

    /// Currently cached token regardless of staleness.
    pub async fn peek(&self) -> Option<AccessToken> {
        self.current.lock().await.clone()
    }
}

impl<S, E> TokenProvider for TokenCache<S, E>
where
    S: AssertionSigner,
    E: TokenExchanger,
{
    async fn valid_token(&self) -> Result<AccessToken, ReportError> {
        self.get_valid_token().await
    }
}
