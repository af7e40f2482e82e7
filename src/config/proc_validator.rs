//! Configuration validation with aggregated errors.
//! - Collects every issue into Vec<String> instead of stopping at the first
//! - Checks endpoint URLs, credentials, mail addresses, schedule and timeouts
//! - Secret values are checked for shape only; they are resolved at startup

use lettre::message::Mailbox;
use reqwest::Url;
use tracing::{error, info};

use crate::config::service::{
    FeedbackConfig, MailConfig, SecretValue, ServiceAccountConfig, ServiceConfig,
    SummarizerConfig,
};
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_service_account(&cfg.service_account, &mut errors);
    validate_url("iam.token_url", &cfg.iam.token_url, &mut errors);
    validate_feedback(&cfg.feedback, &mut errors);
    validate_summarizer(&cfg.summarizer, &mut errors);
    validate_mail(&cfg.mail, &mut errors);

    if errors.is_empty() {
        info!("config validated");
        return Ok(());
    }

    let metrics = get_metrics().await;
    for err in &errors {
        error!("config validation: {}", err);
        metrics.config_validation_errors.inc();
    }
    Err(errors)
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled {
        if !settings.metrics.path.starts_with('/') {
            errors.push(format!(
                "settings.metrics.path '{}' must start with '/'",
                settings.metrics.path
            ));
        }
        if settings.server.port.parse::<u16>().is_err() {
            errors.push(format!(
                "settings.server.port '{}' is not a valid port",
                settings.server.port
            ));
        }
    }

    let schedule = &settings.schedule;
    if schedule.hour > 23 {
        errors.push(format!("settings.schedule.hour {} must be in 0..=23", schedule.hour));
    }
    if schedule.minute > 59 {
        errors.push(format!("settings.schedule.minute {} must be in 0..=59", schedule.minute));
    }

    let timeouts = &settings.timeouts;
    for (name, secs) in [
        ("feedback_secs", timeouts.feedback_secs),
        ("summarizer_secs", timeouts.summarizer_secs),
        ("mail_secs", timeouts.mail_secs),
    ] {
        if secs == 0 {
            errors.push(format!("settings.timeouts.{} must be greater than 0", name));
        }
    }
}

fn validate_service_account(account: &ServiceAccountConfig, errors: &mut Vec<String>) {
    require_non_empty("service_account.id", &account.id, errors);
    require_non_empty("service_account.key_id", &account.key_id, errors);
    validate_secret("service_account.private_key", &account.private_key, errors);
}

fn validate_feedback(feedback: &FeedbackConfig, errors: &mut Vec<String>) {
    validate_url("feedback.base_url", &feedback.base_url, errors);
    validate_secret("feedback.secret", &feedback.secret, errors);
}

fn validate_summarizer(summarizer: &SummarizerConfig, errors: &mut Vec<String>) {
    validate_url("summarizer.completion_url", &summarizer.completion_url, errors);
    require_non_empty("summarizer.folder_id", &summarizer.folder_id, errors);
    require_non_empty("summarizer.model", &summarizer.model, errors);
    require_non_empty("summarizer.instruction", &summarizer.instruction, errors);
}

fn validate_mail(mail: &MailConfig, errors: &mut Vec<String>) {
    require_non_empty("mail.smtp.host", &mail.smtp.host, errors);
    if mail.smtp.port == 0 {
        errors.push("mail.smtp.port must not be 0".to_owned());
    }
    validate_secret("mail.smtp.password", &mail.smtp.password, errors);

    let detail = &mail.detail;
    validate_mailbox("mail.from", &detail.from, errors);
    if detail.to.is_empty() {
        errors.push("mail.to is empty; at least one recipient required".to_owned());
    }
    for (idx, address) in detail.to.iter().enumerate() {
        validate_mailbox(&format!("mail.to[{}]", idx), address, errors);
    }
    require_non_empty("mail.subject", &detail.subject, errors);
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<String>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "{} '{}' must use http or https, got '{}'",
            field,
            value,
            url.scheme()
        )),
        Err(err) => errors.push(format!("{} '{}' is not a valid URL: {}", field, value, err)),
    }
}

fn validate_mailbox(field: &str, value: &str, errors: &mut Vec<String>) {
    if let Err(err) = value.parse::<Mailbox>() {
        errors.push(format!("{} '{}' is not a valid address: {}", field, value, err));
    }
}

fn validate_secret(field: &str, secret: &SecretValue, errors: &mut Vec<String>) {
    match secret {
        SecretValue::Literal { value } => require_non_empty(field, value, errors),
        SecretValue::FromEnv { from_env } => {
            require_non_empty(&format!("{}.from_env", field), from_env, errors)
        }
        SecretValue::FromFile { path } => {
            require_non_empty(&format!("{}.path", field), path, errors)
        }
    }
}

fn require_non_empty(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{} must not be empty", field));
    }
}
