mod contact_email;
mod contact_message;
mod contact_name;
mod submission;

pub use contact_email::ContactEmail;
pub use contact_message::ContactMessage;
pub use contact_name::ContactName;
pub use submission::{ContactForm, FieldError, Submission, ValidationErrors};
