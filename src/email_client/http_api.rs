use super::{EmailClient, EmailError, OutgoingEmail};
use crate::domain::ContactEmail;
use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Client for a Postmark-style JSON email API.
#[derive(Debug)]
pub struct HttpEmailClient {
    base_url: Url,
    sender: ContactEmail,
    http_client: Client,
    authorization_token: Secret<String>,
}

impl HttpEmailClient {
    /// Create a new email client. Every request is cancelled after `timeout`.
    pub fn new(
        base_url: Url,
        sender: ContactEmail,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            sender,
            http_client,
            authorization_token,
        })
    }

    fn endpoint(&self) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().push("email");
            })
            .ok();
        url
    }
}

#[async_trait]
impl EmailClient for HttpEmailClient {
    #[tracing::instrument(name = "Send email through HTTP API", skip_all, fields(recipient = %email.to))]
    async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: email.to.as_ref(),
            reply_to: email.reply_to.as_ref().map(AsRef::as_ref),
            subject: &email.subject,
            html_body: &email.html_body,
            text_body: &email.text_body,
        };

        self.http_client
            .post(self.endpoint())
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    text_body: &'a str,
    html_body: &'a str,
}
