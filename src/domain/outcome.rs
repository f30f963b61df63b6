use derive_more::Display;

/// Terminal classification of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    #[display(fmt = "validation-rejected")]
    ValidationRejected,
    #[display(fmt = "demo-stored")]
    DemoStored,
    #[display(fmt = "remote-accepted")]
    RemoteAccepted,
    #[display(fmt = "remote-validation-error")]
    RemoteValidationError,
    #[display(fmt = "remote-other-error")]
    RemoteOtherError,
    #[display(fmt = "network-error")]
    NetworkError,
}

impl Outcome {
    /// Drives the success/error styling of the status message.
    pub fn is_success(self) -> bool {
        matches!(self, Self::DemoStored | Self::RemoteAccepted)
    }
}

/// What the user ends up seeing for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub outcome: Outcome,
    pub message: String,
}

impl SubmissionReport {
    pub fn new(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }
}
