use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::service::ServiceConfig;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::observability::metrics::get_metrics;

/// Load, expand, parse and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config file '{}'", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    let service_config = parse_config(expanded).await?;

    debug!("validation config ...");
    if let Err(errors) = proc_validator::validate_service_config(&service_config).await {
        bail!("config is not valid: {}", errors.join("; "));
    }
    Ok(service_config)
}

/// Parse YAML and apply defaults. Validation is a separate step.
pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_parse_failures.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging =
            Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with the environment value.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
