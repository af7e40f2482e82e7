use std::{env, fs};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{DEFAULT_COMPLETION_URL, DEFAULT_IAM_TOKEN_URL, DEFAULT_SMTP_PORT};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub service_account: ServiceAccountConfig,
    #[serde(default)]
    pub iam: IamConfig,
    pub feedback: FeedbackConfig,
    pub summarizer: SummarizerConfig,
    pub mail: MailConfig,
}

/// ================================
/// Credentials
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceAccountConfig {
    pub id: String,
    pub key_id: String,
    pub private_key: SecretValue,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IamConfig {
    #[serde(default = "default_iam_token_url")]
    pub token_url: String,
}

impl Default for IamConfig {
    fn default() -> Self {
        Self { token_url: default_iam_token_url() }
    }
}

/// Secret material, resolved once at startup
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SecretValue {
    Literal {
        value: String,
    },
    FromEnv {
        from_env: String,
    },
    FromFile {
        path: String,
    },
}

impl SecretValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            SecretValue::Literal { value } => Ok(value.to_owned()),
            SecretValue::FromEnv { from_env } => env::var(from_env)
                .map_err(|err| anyhow!("environment variable '{}': {}", from_env, err)),
            SecretValue::FromFile { path } => fs::read_to_string(path)
                .with_context(|| format!("reading secret file '{}'", path))
                .map(|content| content.trim().to_string()),
        }
    }
}

/// ================================
/// Collaborators
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    pub base_url: String,
    /// shared secret the feedback API verifies its bearer token with
    pub secret: SecretValue,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    #[serde(default = "default_completion_url")]
    pub completion_url: String,
    pub folder_id: String,
    pub model: String,
    pub instruction: String,
}

impl SummarizerConfig {
    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub smtp: SmtpConfig,
    #[serde(flatten)]
    pub detail: EmailDetail,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// defaults to the sender address
    pub username: Option<String>,
    pub password: SecretValue,
}

/// Static recipients, sender and subject of the weekly mail
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EmailDetail {
    pub to: Vec<String>,
    pub from: String,
    pub subject: String,
}

fn default_iam_token_url() -> String {
    DEFAULT_IAM_TOKEN_URL.to_owned()
}

fn default_completion_url() -> String {
    DEFAULT_COMPLETION_URL.to_owned()
}

fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}
