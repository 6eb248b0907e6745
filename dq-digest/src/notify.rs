//! Report delivery by email.
//!
//! [`SmtpNotifier`] wraps the `lettre` async SMTP transport: it attaches the
//! rendered report to a fixed message and sends it through an authenticated
//! STARTTLS relay. Every failure surfaces as [`ErrorKind::MailError`].

use crate::config::MailConfig;
use crate::prelude::*;
use crate::security::SecureString;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use tracing::{info, instrument};

pub const SUBJECT: &str = "Data Validation (sales and customers) report";
pub const BODY: &str =
    "Please find attached the data validation summary for sales and customers in PDF format.\n\n";
/// File name the report is attached under, whatever its path on disk.
pub const ATTACHMENT_NAME: &str = "combined_report.pdf";
const ATTACHMENT_CONTENT_TYPE: &str = "application/pdf";

/// Delivers a rendered report.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends the document at `path`.
    async fn send(&self, path: &Path) -> Result<()>;
}

/// Sends the report through an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    host: String,
    port: u16,
    sender: String,
    password: SecureString,
    recipient: String,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            sender: config.sender.clone(),
            password: config.password.clone(),
            recipient: config.recipient.clone(),
        }
    }

    fn mailbox(address: &str, role: &str) -> Result<Mailbox> {
        address.parse::<Mailbox>().map_err(|e| {
            DigestError::mail(format!("invalid {role} address '{address}'"), Some(Box::new(e)))
        })
    }

    /// Builds the message for the report at `path`.
    pub async fn compose(&self, path: &Path) -> Result<Message> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DigestError::mail(
                format!("cannot read attachment {}", path.display()),
                Some(Box::new(e)),
            )
        })?;
        let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
            .map_err(|e| DigestError::mail("invalid attachment content type", Some(Box::new(e))))?;

        Message::builder()
            .from(Self::mailbox(&self.sender, "sender")?)
            .to(Self::mailbox(&self.recipient, "recipient")?)
            .subject(SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(BODY.to_string()))
                    .singlepart(Attachment::new(ATTACHMENT_NAME.to_string()).body(bytes, content_type)),
            )
            .map_err(|e| DigestError::mail("cannot assemble message", Some(Box::new(e))))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(skip(self), fields(
        smtp.host = %self.host,
        smtp.port = self.port,
        mail.recipient = %self.recipient
    ))]
    async fn send(&self, path: &Path) -> Result<()> {
        let message = self.compose(path).await?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| DigestError::mail("cannot configure SMTP relay", Some(Box::new(e))))?
            .port(self.port)
            .credentials(Credentials::new(
                self.sender.clone(),
                self.password.expose().to_string(),
            ))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| DigestError::mail("SMTP delivery failed", Some(Box::new(e))))?;

        info!("Report email sent");
        Ok(())
    }
}
