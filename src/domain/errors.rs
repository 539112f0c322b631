use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Missing required fields")]
    MissingRequiredFields,
    #[error("{0}")]
    MalformedRequest(String),
    #[error("{0}")]
    MailTransport(String),
}
