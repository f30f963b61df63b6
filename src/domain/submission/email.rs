use derive_more::Display;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// `local-part@domain.tld`: no whitespace or `@` on either side, at least one
/// dot in the domain.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("the email pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "{}", _0)]
pub struct Email(String);

impl TryFrom<String> for Email {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if EMAIL_PATTERN.is_match(value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
