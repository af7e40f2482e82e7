use chrono::Weekday;
use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_FEEDBACK_TIMEOUT_SECS, DEFAULT_MAIL_TIMEOUT_SECS, DEFAULT_SUMMARIZER_TIMEOUT_SECS,
};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_owned(), port: "9100".to_owned() }
    }
}

/// ================================
/// Weekly trigger, evaluated in UTC
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_weekday")]
    pub weekday: Weekday,
    #[serde(default)]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { weekday: default_weekday(), hour: 0, minute: 0 }
    }
}

/// Bounds for the outbound calls; the token exchange bound is fixed.
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutsConfig {
    #[serde(default = "default_feedback_timeout")]
    pub feedback_secs: u64,
    #[serde(default = "default_summarizer_timeout")]
    pub summarizer_secs: u64,
    #[serde(default = "default_mail_timeout")]
    pub mail_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            feedback_secs: default_feedback_timeout(),
            summarizer_secs: default_summarizer_timeout(),
            mail_secs: default_mail_timeout(),
        }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_weekday() -> Weekday {
    Weekday::Sat
}

fn default_feedback_timeout() -> u64 {
    DEFAULT_FEEDBACK_TIMEOUT_SECS
}

fn default_summarizer_timeout() -> u64 {
    DEFAULT_SUMMARIZER_TIMEOUT_SECS
}

fn default_mail_timeout() -> u64 {
    DEFAULT_MAIL_TIMEOUT_SECS
}
