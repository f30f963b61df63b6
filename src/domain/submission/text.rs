use derive_more::Display;

use super::ValidationError;

/// A field that must hold something other than whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "{}", _0)]
pub struct RequiredText(String);

impl TryFrom<String> for RequiredText {
    type Error = ValidationError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ValidationError::MissingFields);
        }

        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
