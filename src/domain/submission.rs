use super::{ContactEmail, ContactMessage, ContactName};
use utoipa::ToSchema;

/// Raw contact form fields as they arrive on the wire.
/// Missing and `null` fields are both treated as empty.
#[derive(Debug, Default, serde::Deserialize, ToSchema)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single violated rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
        }
    }
}

/// Every rule a submission violated, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Submission failed validation on {} field(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl AsRef<[FieldError]> for ValidationErrors {
    fn as_ref(&self) -> &[FieldError] {
        &self.0
    }
}

/// A validated contact form submission.
#[derive(Debug, Clone)]
pub struct Submission {
    name: ContactName,
    email: ContactEmail,
    message: ContactMessage,
}

impl Submission {
    /// Validate all fields of the form. Every field is checked even when an
    /// earlier one fails, so the caller gets the complete list of problems.
    pub fn parse(form: ContactForm) -> Result<Self, ValidationErrors> {
        let name = ContactName::parse(form.name.unwrap_or_default());
        let email = ContactEmail::parse(form.email.unwrap_or_default());
        let message = ContactMessage::parse(form.message.unwrap_or_default());

        match (name, email, message) {
            (Ok(name), Ok(email), Ok(message)) => Ok(Self {
                name,
                email,
                message,
            }),
            (name, email, message) => {
                let errors = [
                    name.err().map(|e| FieldError::new("name", e)),
                    email.err().map(|e| FieldError::new("email", e)),
                    message.err().map(|e| FieldError::new("message", e)),
                ];
                Err(ValidationErrors(errors.into_iter().flatten().collect()))
            }
        }
    }

    pub fn name(&self) -> &ContactName {
        &self.name
    }

    pub fn email(&self) -> &ContactEmail {
        &self.email
    }

    pub fn message(&self) -> &ContactMessage {
        &self.message
    }
}
