use std::env;

use thiserror::Error;

const DEFAULT_ADMIN_EMAIL: &str = "test@example.com";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid port number, got '{value}'")]
    InvalidPort { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl SmtpSettings {
    /// `None` when either the user or the password is empty, which turns
    /// sending off entirely.
    pub fn credentials(&self) -> Option<SmtpCredentials> {
        if self.user.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(SmtpCredentials {
            user: self.user.clone(),
            password: self.password.clone(),
        })
    }
}

/// Service settings, resolved once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub admin_email: String,
    pub smtp: SmtpSettings,
    pub escape_html: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("SMTP_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                name: "SMTP_PORT",
                value,
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            smtp: SmtpSettings {
                host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port,
                user: lookup("SMTP_USER").unwrap_or_default(),
                password: lookup("SMTP_PASSWORD").unwrap_or_default(),
            },
            escape_html: lookup("ESCAPE_HTML").is_some_and(|v| parse_flag(&v)),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
