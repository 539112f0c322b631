use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SmtpCredentials, SmtpSettings};
use crate::domain::errors::DomainError;
use crate::domain::ports::{MailDispatcher, OutgoingMail};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<AddressError> for DomainError {
    fn from(e: AddressError) -> Self {
        DomainError::MailTransport(e.to_string())
    }
}

impl From<lettre::error::Error> for DomainError {
    fn from(e: lettre::error::Error) -> Self {
        DomainError::MailTransport(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for DomainError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        DomainError::MailTransport(e.to_string())
    }
}

// ── Mailer ───────────────────────────────────────────────────────────────────

/// Sends mail through an SMTP relay, upgrading the session with STARTTLS and
/// authenticating with `AUTH PLAIN`.
///
/// The transport is built without a connection pool, so every call to
/// [`MailDispatcher::send`] opens its own session and closes it before
/// returning, on success and on failure alike.
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: SmtpCredentials,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings, credentials: SmtpCredentials) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            credentials,
        }
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, DomainError> {
        let from: Mailbox = self.credentials.user.parse()?;
        let to: Mailbox = mail.to.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.as_str())
            .multipart(
                MultiPart::alternative().singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(mail.html_body.clone()),
                ),
            )?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DomainError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(
                self.credentials.user.clone(),
                self.credentials.password.clone(),
            ))
            .authentication(vec![Mechanism::Plain])
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl MailDispatcher for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
        let message = self.build_message(mail)?;
        let transport = self.transport()?;

        log::debug!("Relaying order email via {}:{}", self.host, self.port);
        transport.send(message).await?;
        Ok(())
    }
}
