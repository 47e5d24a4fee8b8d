//! Outbound mail.
//!
//! Delivery hides behind the [`MailSender`] capability so the recovery flow
//! can be exercised against a recording double. [`SmtpMailer`] is the real
//! transport (lettre over rustls); [`LogMailer`] is the development default
//! and simply logs the would-be message. Neither retries: a failed send is
//! surfaced immediately and the caller decides what to do.

pub mod template;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

/// An asset embedded in the message body via its content-id.
#[derive(Debug, Clone)]
pub struct InlineAttachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub content_id: String,
}

/// A fully composed message, built transiently per send.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<InlineAttachment>,
}

/// Mail delivery abstraction used by the recovery orchestrator.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver a message or return an error; no retry is attempted here.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        info!(
            to = %email.to,
            subject = %email.subject,
            attachments = email.attachments.len(),
            "mail send stub"
        );
        Ok(())
    }
}

/// SMTP delivery via lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a transport for the relay. `secure` selects implicit TLS
    /// (SMTPS, typically 465) over STARTTLS (typically 587).
    ///
    /// # Errors
    /// Returns an error if the relay host or sender address is invalid.
    pub fn new(
        host: &str,
        port: u16,
        secure: bool,
        username: Option<&str>,
        password: Option<&SecretString>,
        from: &str,
    ) -> Result<Self> {
        let mut builder = if secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .with_context(|| format!("invalid SMTP relay host: {host}"))?
        .port(port);

        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.expose_secret().to_string(),
            ));
        }

        let from = from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid sender address: {from}"))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(email
                .to
                .parse::<Mailbox>()
                .with_context(|| format!("invalid recipient address: {}", email.to))?)
            .subject(email.subject.clone());

        let html = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone());

        let message = if email.attachments.is_empty() {
            builder.singlepart(html)
        } else {
            let mut related = MultiPart::related().singlepart(html);
            for attachment in &email.attachments {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|err| {
                    anyhow::anyhow!("invalid content type {}: {err}", attachment.content_type)
                })?;
                related = related.singlepart(
                    Attachment::new_inline(attachment.content_id.clone())
                        .body(Body::new(attachment.content.clone()), content_type),
                );
            }
            builder.multipart(related)
        };

        message.context("failed to build mail message")
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .with_context(|| format!("failed to send mail to {}", email.to))?;
        Ok(())
    }
}
