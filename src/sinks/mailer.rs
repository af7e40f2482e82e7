use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::service::SmtpConfig;
use crate::errors::{ClassifiedError, ErrorKind, ReportError};

/// Delivers one mail with identical plain-text and HTML bodies.
pub trait Mailer: Send + Sync {
    fn send_mail(
        &self,
        to: &[String],
        from: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), ReportError>> + Send;
}

/// SMTP relay over implicit TLS.
#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, password: String, sender: &str, timeout: Duration) -> Result<Self> {
        let username = smtp.username.clone().unwrap_or_else(|| sender.to_owned());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .with_context(|| format!("configuring SMTP relay '{}'", smtp.host))?
            .port(smtp.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(timeout))
            .build();

        Ok(Self { host: smtp.host.to_owned(), transport })
    }

    pub fn with_transport(host: &str, transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        Self { host: host.to_owned(), transport }
    }
}

impl Mailer for SmtpMailer {
    async fn send_mail(
        &self,
        to: &[String],
        from: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), ReportError> {
        let message = build_message(to, from, subject, body).map_err(ReportError::MailDelivery)?;

        match self.transport.send(message).await {
            Ok(response) => {
                info!(host = %self.host, recipients = to.len(), code = %response.code(), "email sent");
                Ok(())
            }
            Err(err) => {
                let classified = classify_smtp(&self.host, err);
                error!(host = %self.host, kind = %classified.kind, status = ?classified.status, "mail delivery failed: {}", classified.message);
                Err(ReportError::MailDelivery(classified))
            }
        }
    }
}

/// multipart/alternative with the same text in both parts
pub fn build_message(
    to: &[String],
    from: &str,
    subject: &str,
    body: &str,
) -> Result<Message, ClassifiedError> {
    let sender: Mailbox = from.parse().map_err(|err| {
        ClassifiedError::local(format!("invalid sender address '{}'", from)).with_cause(err)
    })?;

    let mut builder = Message::builder().from(sender).subject(subject);
    for address in to {
        let recipient: Mailbox = address.parse().map_err(|err| {
            ClassifiedError::local(format!("invalid recipient address '{}'", address)).with_cause(err)
        })?;
        builder = builder.to(recipient);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(body.to_owned(), body.to_owned()))
        .map_err(|err| ClassifiedError::local("failed to build email message").with_cause(err))
}

fn classify_smtp(host: &str, err: lettre::transport::smtp::Error) -> ClassifiedError {
    let status = err.status().and_then(|code| code.to_string().parse::<u16>().ok());
    let kind = if err.is_permanent() || err.is_transient() {
        ErrorKind::RemoteRejected
    } else if err.is_client() {
        ErrorKind::LocalFailure
    } else {
        ErrorKind::RemoteUnreachable
    };

    let message = match kind {
        ErrorKind::RemoteRejected => format!("SMTP server {} rejected the mail: {}", host, err),
        ErrorKind::LocalFailure => format!("mail to {} was not attempted: {}", host, err),
        ErrorKind::RemoteUnreachable => format!("SMTP server {} is not responding: {}", host, err),
    };
    ClassifiedError { status, ..ClassifiedError::new(kind, message) }.with_cause(err)
}
