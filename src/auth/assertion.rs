use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ClassifiedError, ReportError};
use crate::utils::constants::ASSERTION_LIFETIME_SECS;

/// Claim set presented to the token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAssertion {
    pub aud: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl ServiceAssertion {
    pub fn new(audience: &str, issuer: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            aud: audience.to_owned(),
            iss: issuer.to_owned(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Produces a compact signed assertion for the token exchange.
pub trait AssertionSigner: Send + Sync {
    fn sign(&self, now: DateTime<Utc>) -> Result<String, ReportError>;
}

/// Signs service-account assertions with PS256 and a fixed key id.
#[derive(Clone)]
pub struct ServiceAccountSigner {
    service_account_id: String,
    key_id: String,
    audience: String,
    key: EncodingKey,
}

impl std::fmt::Debug for ServiceAccountSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountSigner")
            .field("service_account_id", &self.service_account_id)
            .field("key_id", &self.key_id)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountSigner {
    /// Parse the private key once; a malformed key fails here instead of on every refresh.
    pub fn new(
        service_account_id: String,
        key_id: String,
        private_key_pem: &str,
        audience: String,
    ) -> Result<Self, ReportError> {
        let key = parse_private_key(private_key_pem)?;
        Ok(Self { service_account_id, key_id, audience, key })
    }

    pub fn service_account_id(&self) -> &str {
        &self.service_account_id
    }
}

impl AssertionSigner for ServiceAccountSigner {
    fn sign(&self, now: DateTime<Utc>) -> Result<String, ReportError> {
        let claims = ServiceAssertion::new(&self.audience, &self.service_account_id, now);
        encode_assertion(&claims, &self.key_id, &self.key)
    }
}

/// One-shot form: parse `private_key_pem` and sign a fresh assertion valid for one hour from `now`.
pub fn sign_assertion(
    service_account_id: &str,
    key_id: &str,
    private_key_pem: &str,
    audience: &str,
    now: DateTime<Utc>,
) -> Result<String, ReportError> {
    let key = parse_private_key(private_key_pem)?;
    let claims = ServiceAssertion::new(audience, service_account_id, now);
    encode_assertion(&claims, key_id, &key)
}

fn encode_assertion(
    claims: &ServiceAssertion,
    key_id: &str,
    key: &EncodingKey,
) -> Result<String, ReportError> {
    let mut header = Header::new(Algorithm::PS256);
    header.kid = Some(key_id.to_owned());

    let jwt = jsonwebtoken::encode(&header, claims, key).map_err(|err| {
        ReportError::Signing(ClassifiedError::local(format!(
            "failed to sign assertion for {}: {}",
            claims.iss, err
        )))
    })?;
    debug!(iss = %claims.iss, iat = claims.iat, exp = claims.exp, "service assertion signed");
    Ok(jwt)
}

/// Key files issued by the cloud console carry a comment line before the PEM block.
fn parse_private_key(private_key_pem: &str) -> Result<EncodingKey, ReportError> {
    let pem = private_key_pem
        .find("-----BEGIN")
        .map(|start| &private_key_pem[start..])
        .ok_or_else(|| {
            ReportError::Signing(ClassifiedError::local(
                "private key is not PEM encoded".to_owned(),
            ))
        })?;

    EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|err| {
        ReportError::Signing(ClassifiedError::local(format!(
            "malformed service account private key: {}",
            err
        )))
    })
}
