use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::errors::ClassifiedError;
use crate::utils::constants::{FEEDBACK_JWT_APP, FEEDBACK_JWT_LIFETIME_SECS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackClaims {
    pub app: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues the HS256 bearer token the feedback API expects.
///
/// Independent from the IAM token: the feedback fetch never touches the token cache.
#[derive(Clone)]
pub struct FeedbackJwtSigner {
    key: EncodingKey,
}

impl FeedbackJwtSigner {
    pub fn new(secret: &str) -> Self {
        Self { key: EncodingKey::from_secret(secret.as_bytes()) }
    }

    pub fn sign(&self, now: DateTime<Utc>) -> Result<String, ClassifiedError> {
        let iat = now.timestamp();
        let claims = FeedbackClaims {
            app: FEEDBACK_JWT_APP.to_owned(),
            iat,
            exp: iat + FEEDBACK_JWT_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|err| ClassifiedError::local(format!("failed to sign feedback token: {}", err)))
    }
}
