pub mod email;
pub mod text;

use serde_json::{Map, Value};

use self::email::Email;
use self::text::RequiredText;

/// Sent as `_subject` when a contact message leaves its subject blank.
pub const DEFAULT_CONTACT_SUBJECT: &str = "Website contact form";

/// Which of the site's forms a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Newsletter,
    Contact,
}

impl FormKind {
    /// Name of the durable storage slot holding this form's demo records.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Newsletter => "ef_news",
            Self::Contact => "ef_contacts",
        }
    }

    pub fn demo_message(self) -> &'static str {
        match self {
            Self::Newsletter => "Thanks! You’re subscribed (demo). Replace data-endpoint with your API URL to receive real submissions.",
            Self::Contact => {
                "Thanks — message saved (demo). Configure data-endpoint to send real messages."
            }
        }
    }

    pub fn accepted_message(self) -> &'static str {
        match self {
            Self::Newsletter => "Thanks! You’re subscribed.",
            Self::Contact => "Message sent — thank you!",
        }
    }

    /// Shown for any failure the user can only answer by trying again.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Newsletter => "Subscription failed — please try again later.",
            Self::Contact => "Sending failed — please try again later.",
        }
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Newsletter => write!(f, "newsletter"),
            Self::Contact => write!(f, "contact"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in your name, email and message.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct NewsletterForm {
    pub email: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

/// Field values exactly as the user typed them.
#[derive(Debug, Clone)]
pub enum FormInput {
    Newsletter(NewsletterForm),
    Contact(ContactForm),
}

impl FormInput {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Newsletter(_) => FormKind::Newsletter,
            Self::Contact(_) => FormKind::Contact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterSignup {
    pub email: Email,
}

impl TryFrom<NewsletterForm> for NewsletterSignup {
    type Error = ValidationError;
    fn try_from(value: NewsletterForm) -> Result<Self, Self::Error> {
        let email = Email::try_from(value.email)?;
        Ok(Self { email })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: RequiredText,
    pub email: Email,
    /// Trimmed, possibly empty.
    pub subject: String,
    pub message: RequiredText,
}

impl ContactMessage {
    pub fn subject_or_default(&self) -> &str {
        if self.subject.is_empty() {
            DEFAULT_CONTACT_SUBJECT
        } else {
            &self.subject
        }
    }
}

impl TryFrom<ContactForm> for ContactMessage {
    type Error = ValidationError;
    fn try_from(value: ContactForm) -> Result<Self, Self::Error> {
        // Presence of every required field is checked before the email format.
        let name = RequiredText::try_from(value.name)?;
        let email = RequiredText::try_from(value.email)?;
        let message = RequiredText::try_from(value.message)?;
        let email = Email::try_from(email.to_string())?;

        Ok(Self {
            name,
            email,
            subject: value.subject.trim().to_owned(),
            message,
        })
    }
}

/// A validated submission, ready to be stored or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Newsletter(NewsletterSignup),
    Contact(ContactMessage),
}

impl TryFrom<FormInput> for Submission {
    type Error = ValidationError;
    fn try_from(value: FormInput) -> Result<Self, Self::Error> {
        match value {
            FormInput::Newsletter(form) => Ok(Self::Newsletter(form.try_into()?)),
            FormInput::Contact(form) => Ok(Self::Contact(form.try_into()?)),
        }
    }
}

impl Submission {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Newsletter(_) => FormKind::Newsletter,
            Self::Contact(_) => FormKind::Contact,
        }
    }

    /// Fields posted to a remote endpoint, in the order the endpoint sees them.
    pub fn remote_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Newsletter(signup) => vec![
                ("email", signup.email.to_string()),
                ("_replyto", signup.email.to_string()),
            ],
            Self::Contact(contact) => vec![
                ("name", contact.name.to_string()),
                ("email", contact.email.to_string()),
                ("_replyto", contact.email.to_string()),
                ("_subject", contact.subject_or_default().to_owned()),
                ("message", contact.message.to_string()),
            ],
        }
    }

    /// Fields kept in a demo record. The subject is stored as typed.
    pub fn record_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::Newsletter(signup) => {
                fields.insert("email".into(), signup.email.to_string().into());
            }
            Self::Contact(contact) => {
                fields.insert("name".into(), contact.name.to_string().into());
                fields.insert("email".into(), contact.email.to_string().into());
                fields.insert("subject".into(), contact.subject.clone().into());
                fields.insert("message".into(), contact.message.to_string().into());
            }
        }
        fields
    }
}
