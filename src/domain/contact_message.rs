use unicode_segmentation::UnicodeSegmentation;

const MIN_LENGTH: usize = 10;
const MAX_LENGTH: usize = 1000;

/// The trimmed body of a contact form submission, 10 to 1000 characters long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage(String);

impl ContactMessage {
    pub fn parse(s: String) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Message is required".to_string());
        }

        let length = trimmed.graphemes(true).count();
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(format!(
                "Message must be between {MIN_LENGTH} and {MAX_LENGTH} characters"
            ));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for ContactMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
