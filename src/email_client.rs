//! Outgoing mail. The rest of the application only sees the [`EmailClient`]
//! trait; which relay actually delivers the message is decided by the
//! configuration.

mod http_api;
mod smtp;

pub use self::http_api::HttpEmailClient;
pub use self::smtp::{SmtpEmailClient, SmtpService};

use crate::{
    configuration::{EmailSettings, EmailTransport},
    domain::ContactEmail,
};
use async_trait::async_trait;
use std::sync::Arc;

/// A fully rendered email, ready to be handed to a relay.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: ContactEmail,
    pub reply_to: Option<ContactEmail>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to reach the email API")]
    Http(#[from] reqwest::Error),
    #[error("SMTP transport error")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Invalid email address")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build the email message")]
    Message(#[from] lettre::error::Error),
}

/// The capability of sending a single email.
#[async_trait]
pub trait EmailClient: Send + Sync + std::fmt::Debug {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Build the email client selected by the configuration.
pub fn from_settings(settings: &EmailSettings) -> anyhow::Result<Arc<dyn EmailClient>> {
    let sender = settings.sender().map_err(anyhow::Error::msg)?;

    let client: Arc<dyn EmailClient> = match settings.transport {
        EmailTransport::Smtp => {
            let service = SmtpService::from_settings(settings).map_err(anyhow::Error::msg)?;
            tracing::info!(
                host = %service.host,
                port = service.port,
                "Email service configured with SMTP"
            );
            Arc::new(SmtpEmailClient::new(
                &service,
                sender,
                settings.username.clone(),
                settings.password.clone(),
                settings.timeout(),
            )?)
        }
        EmailTransport::Http => {
            let base_url = settings.base_url().map_err(anyhow::Error::msg)?;
            tracing::info!(%base_url, "Email service configured with HTTP API");
            Arc::new(HttpEmailClient::new(
                base_url,
                sender,
                settings.authorization_token.clone(),
                settings.timeout(),
            )?)
        }
    };

    Ok(client)
}
