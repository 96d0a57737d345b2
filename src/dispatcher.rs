use crate::{
    domain::{ContactEmail, Submission},
    email_client::{EmailClient, EmailError, OutgoingEmail},
};
use askama::Template;
use std::sync::Arc;

const ACKNOWLEDGEMENT_SUBJECT: &str = "Thank you for contacting me!";

/// The site owner, who receives every submission.
#[derive(Debug, Clone)]
pub struct Owner {
    pub address: ContactEmail,
    pub name: String,
}

/// Turns a validated submission into the two emails of a contact request:
/// a notification to the owner and an acknowledgement back to the sender.
#[derive(Debug)]
pub struct NotificationDispatcher {
    email_client: Arc<dyn EmailClient>,
    owner: Owner,
}

impl NotificationDispatcher {
    pub fn new(email_client: Arc<dyn EmailClient>, owner: Owner) -> Self {
        Self {
            email_client,
            owner,
        }
    }

    /// Send the owner notification, then the acknowledgement.
    ///
    /// The acknowledgement tells the sender their message arrived, so it is
    /// only sent once the owner notification went through.
    #[tracing::instrument(
        name = "Dispatch contact notifications",
        skip_all,
        fields(sender_email = %submission.email())
    )]
    pub async fn dispatch(&self, submission: &Submission) -> Result<(), DispatchError> {
        let notification = self.owner_notification(submission)?;
        let acknowledgement = self.sender_acknowledgement(submission)?;

        self.email_client
            .send_email(&notification)
            .await
            .map_err(DispatchError::OwnerNotification)?;
        tracing::info!("Owner notification sent");

        self.email_client
            .send_email(&acknowledgement)
            .await
            .map_err(DispatchError::SenderAcknowledgement)?;
        tracing::info!("Sender acknowledgement sent");

        Ok(())
    }

    fn owner_notification(&self, submission: &Submission) -> Result<OutgoingEmail, DispatchError> {
        let name = submission.name().as_ref();
        let email = submission.email().as_ref();
        let message = submission.message().as_ref();

        Ok(OutgoingEmail {
            to: self.owner.address.clone(),
            reply_to: Some(submission.email().clone()),
            subject: header_safe(&format!("New Portfolio Contact from {name}")),
            html_body: OwnerNotificationHtml {
                name,
                email,
                message,
            }
            .render()?,
            text_body: OwnerNotificationText {
                name,
                email,
                message,
            }
            .render()?,
        })
    }

    fn sender_acknowledgement(
        &self,
        submission: &Submission,
    ) -> Result<OutgoingEmail, DispatchError> {
        let name = submission.name().as_ref();
        let message = submission.message().as_ref();
        let owner_name = self.owner.name.as_str();

        Ok(OutgoingEmail {
            to: submission.email().clone(),
            reply_to: Some(self.owner.address.clone()),
            subject: ACKNOWLEDGEMENT_SUBJECT.to_string(),
            html_body: SenderAcknowledgementHtml {
                name,
                message,
                owner_name,
            }
            .render()?,
            text_body: SenderAcknowledgementText {
                name,
                message,
                owner_name,
            }
            .render()?,
        })
    }
}

/// Subjects end up in a mail header, where line breaks must not appear.
fn header_safe(subject: &str) -> String {
    subject
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to render the notification emails")]
    Render(#[from] askama::Error),
    #[error("Failed to notify the site owner")]
    OwnerNotification(#[source] EmailError),
    #[error("Notified the site owner but failed to acknowledge the sender")]
    SenderAcknowledgement(#[source] EmailError),
}

impl DispatchError {
    /// Whether the owner received the submission despite the failure.
    pub fn owner_notified(&self) -> bool {
        matches!(self, Self::SenderAcknowledgement(_))
    }
}

#[derive(Template)]
#[template(path = "owner_notification.html")]
struct OwnerNotificationHtml<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "owner_notification.txt")]
struct OwnerNotificationText<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "sender_acknowledgement.html")]
struct SenderAcknowledgementHtml<'a> {
    name: &'a str,
    message: &'a str,
    owner_name: &'a str,
}

#[derive(Template)]
#[template(path = "sender_acknowledgement.txt")]
struct SenderAcknowledgementText<'a> {
    name: &'a str,
    message: &'a str,
    owner_name: &'a str,
}
