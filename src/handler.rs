use std::sync::Arc;

use reqwest::StatusCode;

use crate::client::{FormClient, RemoteResponse};
use crate::domain::endpoint::Endpoint;
use crate::domain::outcome::{Outcome, SubmissionReport};
use crate::domain::submission::{FormInput, FormKind, Submission};
use crate::page::PageContext;
use crate::render::{BusyGuard, Renderer};
use crate::store::{RecordStore, StoredRecord};

const SENDING_MESSAGE: &str = "Sending…";
const GENERIC_VALIDATION_MESSAGE: &str = "Validation error. Please check your input.";

/// Where one submission is on its way to an outcome.
enum State {
    Validating(FormInput),
    DemoStore(Submission),
    Sending(Submission, String),
    /// The endpoint refused the multipart POST with 405; one JSON retry.
    Retrying405(Submission, String),
    Received(FormKind, RemoteResponse),
    Done(SubmissionReport),
}

/// Validates a form, stores or sends it, and reports exactly one outcome.
#[derive(Clone)]
pub struct FormHandler {
    client: FormClient,
    store: Arc<dyn RecordStore>,
}

impl FormHandler {
    pub fn new(client: FormClient, store: Arc<dyn RecordStore>) -> Self {
        Self { client, store }
    }

    #[tracing::instrument(
        name = "Handle form submission",
        skip(self, input, endpoint, page, renderer),
        fields(kind = %input.kind(), submission_id = %uuid::Uuid::new_v4(), demo = endpoint.is_demo())
    )]
    pub async fn submit(
        &self,
        input: FormInput,
        endpoint: &Endpoint,
        page: &PageContext,
        renderer: &dyn Renderer,
    ) -> SubmissionReport {
        // Held from the first request until the report is rendered.
        let mut _busy: Option<BusyGuard<'_>> = None;
        let mut state = State::Validating(input);

        loop {
            state = match state {
                State::Validating(input) => match Submission::try_from(input) {
                    Ok(submission) => match endpoint {
                        Endpoint::Demo => State::DemoStore(submission),
                        Endpoint::Remote(url) => State::Sending(submission, url.clone()),
                    },
                    Err(e) => {
                        tracing::info!(reason = %e, "submission rejected");
                        State::Done(SubmissionReport::new(
                            Outcome::ValidationRejected,
                            e.to_string(),
                        ))
                    }
                },
                State::DemoStore(submission) => {
                    let done = self.store_locally(&submission).await;
                    if done.outcome.is_success() {
                        renderer.clear_fields();
                    }
                    State::Done(done)
                }
                State::Sending(submission, url) => {
                    _busy = Some(BusyGuard::acquire(renderer));
                    renderer.set_progress(SENDING_MESSAGE);

                    let fields = submission.remote_fields();
                    match self.client.post_multipart(&url, &fields).await {
                        Ok(response) if response.status == StatusCode::METHOD_NOT_ALLOWED => {
                            tracing::info!("endpoint refused multipart, retrying as JSON");
                            State::Retrying405(submission, url)
                        }
                        Ok(response) => State::Received(submission.kind(), response),
                        Err(e) => {
                            tracing::error!(detail = ?e, "{} submit error", submission.kind());
                            State::Done(SubmissionReport::new(
                                Outcome::NetworkError,
                                submission.kind().failure_message(),
                            ))
                        }
                    }
                }
                State::Retrying405(submission, url) => {
                    let fields = submission.remote_fields();
                    match self.client.post_json(&url, &fields).await {
                        Ok(response) => State::Received(submission.kind(), response),
                        Err(e) => {
                            tracing::error!(detail = ?e, "{} retry error", submission.kind());
                            State::Done(SubmissionReport::new(
                                Outcome::RemoteOtherError,
                                submission.kind().failure_message(),
                            ))
                        }
                    }
                }
                State::Received(kind, response) => {
                    let done = classify(kind, &response);
                    if done.outcome == Outcome::RemoteAccepted {
                        renderer.clear_fields();
                    } else {
                        tracing::error!(
                            status = response.status.as_u16(),
                            body = %response.text,
                            "{kind} submit error"
                        );
                    }
                    renderer.set_status(done.outcome, &done.message);
                    if page.debug() {
                        renderer.show_debug(&debug_details(&response));
                    }
                    return done;
                }
                State::Done(done) => {
                    renderer.set_status(done.outcome, &done.message);
                    return done;
                }
            };
        }
    }

    async fn store_locally(&self, submission: &Submission) -> SubmissionReport {
        let kind = submission.kind();
        let record = StoredRecord::new(submission.record_fields());

        match self.store.append(kind.storage_key(), record).await {
            Ok(()) => SubmissionReport::new(Outcome::DemoStored, kind.demo_message()),
            Err(e) => {
                tracing::error!(detail = ?e, "failed to store {kind} demo record");
                SubmissionReport::new(Outcome::RemoteOtherError, kind.failure_message())
            }
        }
    }
}

/// Maps a completed response to its outcome and message.
pub fn classify(kind: FormKind, response: &RemoteResponse) -> SubmissionReport {
    if response.status.is_success() {
        return SubmissionReport::new(Outcome::RemoteAccepted, kind.accepted_message());
    }

    let body = response.json();

    if response.status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Some(summary) = body.as_ref().and_then(|b| b.error_summary()) {
            let message = if summary.is_empty() {
                GENERIC_VALIDATION_MESSAGE.to_owned()
            } else {
                summary
            };
            return SubmissionReport::new(Outcome::RemoteValidationError, message);
        }
    }

    let message = body
        .and_then(|b| b.message)
        .unwrap_or_else(|| kind.failure_message().to_owned());
    SubmissionReport::new(Outcome::RemoteOtherError, message)
}

fn debug_details(response: &RemoteResponse) -> String {
    format!(
        "Debug info:\nStatus: {}\n{}",
        response.status.as_u16(),
        response.text
    )
}
