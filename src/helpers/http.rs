use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{classify, ClassifiedError, RawFailure};

/// Send `request` and read the whole body, classifying any failure at `endpoint`.
pub async fn send_and_read(
    request: RequestBuilder,
    endpoint: &str,
) -> Result<(StatusCode, String), ClassifiedError> {
    let response = request
        .send()
        .await
        .map_err(|err| classify(endpoint, RawFailure::Transport(err)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| classify(endpoint, RawFailure::Transport(err)))?;
    debug!(endpoint, status = status.as_u16(), body_len = body.len(), "response received");

    if !status.is_success() {
        return Err(classify(endpoint, RawFailure::Status { status, body }));
    }
    Ok((status, body))
}

/// Decode a success body, treating a malformed payload as a rejection.
pub fn parse_json<T: DeserializeOwned>(
    endpoint: &str,
    status: StatusCode,
    body: &str,
) -> Result<T, ClassifiedError> {
    serde_json::from_str(body).map_err(|err| {
        classify(
            endpoint,
            RawFailure::Payload { status, reason: err.to_string() },
        )
    })
}
