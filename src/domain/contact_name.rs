use unicode_segmentation::UnicodeSegmentation;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 100;

/// Struct to hold the validated name of the person submitting the contact form.
/// The only way to create a `ContactName` is through [`ContactName::parse`],
/// which means consumers of this type are always guaranteed that it holds a
/// trimmed name between 2 and 100 characters long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactName(String);

impl ContactName {
    /// Returns an instance of `ContactName` if the input satisfies all of our
    /// constraints on names, or the message describing the violated rule.
    pub fn parse(s: String) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Name is required".to_string());
        }

        // Using graphemes as some characters are perceived as a single character
        // but are composed of several code points.
        let length = trimmed.graphemes(true).count();
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(format!(
                "Name must be between {MIN_LENGTH} and {MAX_LENGTH} characters"
            ));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
