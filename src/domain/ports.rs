use async_trait::async_trait;

use super::errors::DomainError;

/// A fully rendered email ready to hand to a transport.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait MailDispatcher: Send + Sync + 'static {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError>;
}
