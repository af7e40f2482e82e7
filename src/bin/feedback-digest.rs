use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use feedback_digest::auth::assertion::ServiceAccountSigner;
use feedback_digest::auth::exchange::IamTokenExchanger;
use feedback_digest::auth::feedback_jwt::FeedbackJwtSigner;
use feedback_digest::cache::token_cache::TokenCache;
use feedback_digest::observability::metrics;
use feedback_digest::report::pipeline::ReportPipeline;
use feedback_digest::report::scheduler::{self, WeeklySchedule};
use feedback_digest::server;
use feedback_digest::sinks::mailer::SmtpMailer;
use feedback_digest::sources::completion::CompletionClient;
use feedback_digest::sources::feedback::FeedbackApiClient;
use feedback_digest::utils::config_loader;
use feedback_digest::utils::logging;
use feedback_digest::utils::logging::LogLevel;
use reqwest::Client;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "feedback-digest.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// run one report now and exit instead of waiting for the weekly trigger
    #[arg(long)]
    run_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    let settings = &service_config.settings;
    let timeouts = &settings.timeouts;

    // -------------------------------
    // 2. Create request client
    // -------------------------------

    let client = Client::builder().build()?;

    // -------------------------------
    // 3. Credentials: assertion signer -> IAM exchange -> token cache
    // -------------------------------

    let account = &service_config.service_account;
    let private_key = account
        .private_key
        .resolve()
        .context("resolving service_account.private_key")?;
    let signer = ServiceAccountSigner::new(
        account.id.to_owned(),
        account.key_id.to_owned(),
        &private_key,
        service_config.iam.token_url.to_owned(),
    )?;
    let exchanger = IamTokenExchanger::new(client.clone(), service_config.iam.token_url.to_owned());
    let token_cache = Arc::new(TokenCache::new(signer, exchanger));

    // -------------------------------
    // 4. Collaborators
    // -------------------------------

    let feedback_secret = service_config
        .feedback
        .secret
        .resolve()
        .context("resolving feedback.secret")?;
    let feedback = FeedbackApiClient::new(
        client.clone(),
        service_config.feedback.base_url.to_owned(),
        FeedbackJwtSigner::new(&feedback_secret),
    )
    .with_timeout(Duration::from_secs(timeouts.feedback_secs));

    let summarizer = CompletionClient::new(
        client.clone(),
        service_config.summarizer.to_owned(),
        token_cache.clone(),
    )
    .with_timeout(Duration::from_secs(timeouts.summarizer_secs));

    let mail = &service_config.mail;
    let smtp_password = mail
        .smtp
        .password
        .resolve()
        .context("resolving mail.smtp.password")?;
    let mailer = SmtpMailer::new(
        &mail.smtp,
        smtp_password,
        &mail.detail.from,
        Duration::from_secs(timeouts.mail_secs),
    )?;

    let pipeline = Arc::new(ReportPipeline::new(feedback, summarizer, mailer, mail.detail.to_owned()));

    // -------------------------------
    // 5. Single run on demand
    // -------------------------------

    if args.run_once {
        metrics::mark_up().await;
        let outcome = pipeline.run_weekly_report().await?;
        info!(outcome = outcome.as_str(), "single report run finished");
        return Ok(());
    }

    // -------------------------------
    // 6. Metrics server + weekly trigger
    // -------------------------------

    let schedule = WeeklySchedule::from_config(&settings.schedule)?;
    let http_server = server::server::start(settings);
    let weekly = scheduler::run_weekly(schedule, pipeline);

    info!("Service starting...");
    tokio::try_join!(http_server, weekly)?;

    Ok(())
}
