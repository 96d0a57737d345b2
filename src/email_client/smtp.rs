use super::{EmailClient, EmailError, OutgoingEmail};
use crate::{configuration::EmailSettings, domain::ContactEmail};
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

const SUBMISSION_PORT: u16 = 587;
const IMPLICIT_TLS_PORT: u16 = 465;

/// Where an SMTP relay lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpService {
    pub host: String,
    pub port: u16,
    pub implicit_tls: bool,
}

impl SmtpService {
    fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            implicit_tls: port == IMPLICIT_TLS_PORT,
        }
    }

    /// Look up the relay of a well-known mail provider. Names are matched
    /// case-insensitively and without punctuation, so `Outlook.com` and
    /// `outlookcom` are the same service.
    pub fn well_known(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let (host, port) = match key.as_str() {
            "gmail" | "googlemail" => ("smtp.gmail.com", IMPLICIT_TLS_PORT),
            "outlook" | "outlookcom" | "hotmail" | "live" => {
                ("smtp-mail.outlook.com", SUBMISSION_PORT)
            }
            "office365" | "outlook365" => ("smtp.office365.com", SUBMISSION_PORT),
            "yahoo" | "yahoomail" => ("smtp.mail.yahoo.com", IMPLICIT_TLS_PORT),
            "icloud" | "me" | "mac" => ("smtp.mail.me.com", SUBMISSION_PORT),
            "zoho" | "zohomail" => ("smtp.zoho.com", IMPLICIT_TLS_PORT),
            "fastmail" => ("smtp.fastmail.com", IMPLICIT_TLS_PORT),
            "sendgrid" => ("smtp.sendgrid.net", SUBMISSION_PORT),
            "mailgun" => ("smtp.mailgun.org", IMPLICIT_TLS_PORT),
            _ => return None,
        };

        Some(Self::new(host, port))
    }

    /// An explicit `smtp_host` wins over the service name.
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, String> {
        match &settings.smtp_host {
            Some(host) => Ok(Self::new(host, settings.smtp_port.unwrap_or(SUBMISSION_PORT))),
            None => {
                let mut service = Self::well_known(&settings.service).ok_or_else(|| {
                    format!(
                        "Unknown email service `{}`; set `email.smtp_host` instead",
                        settings.service
                    )
                })?;
                if let Some(port) = settings.smtp_port {
                    service = Self::new(&service.host, port);
                }
                Ok(service)
            }
        }
    }
}

/// Sends mail through an authenticated SMTP relay.
pub struct SmtpEmailClient {
    sender: ContactEmail,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailClient {
    /// Create a client that logs in as `username` and sends as `sender`.
    /// No connection is made until the first email is sent.
    pub fn new(
        service: &SmtpService,
        sender: ContactEmail,
        username: String,
        password: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let builder = if service.implicit_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&service.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&service.host)?
        };

        let mailer = builder
            .port(service.port)
            .credentials(Credentials::new(
                username,
                password.expose_secret().clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self { sender, mailer })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(mailbox(&self.sender)?)
            .to(mailbox(&email.to)?)
            .subject(email.subject.as_str());

        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }

        Ok(builder.multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))?)
    }
}

fn mailbox(email: &ContactEmail) -> Result<Mailbox, EmailError> {
    Ok(Mailbox::from(email.as_ref().parse::<Address>()?))
}

impl std::fmt::Debug for SmtpEmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailClient")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmailClient for SmtpEmailClient {
    #[tracing::instrument(name = "Send email through SMTP", skip_all, fields(recipient = %email.to))]
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build_message(email)?;
        let response = self.mailer.send(message).await?;
        tracing::debug!(code = %response.code(), "SMTP relay accepted the message");
        Ok(())
    }
}
