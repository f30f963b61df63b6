use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Client, StatusCode};
use serde_json::{Map, Value};

use crate::error::ClientError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Posts form fields to a remote form backend.
#[derive(Clone, Debug)]
pub struct FormClient {
    http_client: Client,
}

impl FormClient {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }

    /// Sends the fields as `multipart/form-data`, asking for a JSON reply.
    #[tracing::instrument(name = "Post form as multipart", skip(self, fields))]
    pub async fn post_multipart(
        &self,
        endpoint: &str,
        fields: &[(&'static str, String)],
    ) -> Result<RemoteResponse, ClientError> {
        let form = fields
            .iter()
            .fold(multipart::Form::new(), |form, (name, value)| {
                form.text(*name, value.clone())
            });

        let response = self
            .http_client
            .post(endpoint)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .multipart(form)
            .send()
            .await?;

        RemoteResponse::read(response).await
    }

    /// Sends the fields as a flat JSON object.
    #[tracing::instrument(name = "Post form as JSON", skip(self, fields))]
    pub async fn post_json(
        &self,
        endpoint: &str,
        fields: &[(&'static str, String)],
    ) -> Result<RemoteResponse, ClientError> {
        let body: Map<String, Value> = fields
            .iter()
            .map(|(name, value)| ((*name).to_owned(), Value::from(value.as_str())))
            .collect();

        let response = self
            .http_client
            .post(endpoint)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        RemoteResponse::read(response).await
    }
}

/// A fully read response from a form endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub text: String,
}

impl RemoteResponse {
    async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let text = response.text().await?;

        Ok(Self {
            status,
            content_type,
            text,
        })
    }

    /// The JSON body, if the endpoint declared one and it parses.
    pub fn json(&self) -> Option<ResponseBody> {
        if !self.content_type.contains(JSON_CONTENT_TYPE) {
            return None;
        }

        match serde_json::from_str::<Value>(&self.text) {
            Ok(value) => Some(ResponseBody::from(value)),
            Err(e) => {
                tracing::warn!(detail = e.to_string(), "response claims JSON but does not parse");
                None
            }
        }
    }
}

/// The parts of a form backend's JSON reply the handler looks at:
/// `{message?: string, errors?: [string | {message: string}]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseBody {
    pub message: Option<String>,
    pub errors: Option<Vec<Value>>,
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_owned);
        let errors = value.get("errors").and_then(Value::as_array).cloned();

        Self { message, errors }
    }
}

impl ResponseBody {
    /// Each error's own `message`, or the raw error when it has none,
    /// space-joined. `None` when there is no error list at all.
    pub fn error_summary(&self) -> Option<String> {
        let errors = self.errors.as_ref()?;
        let summary = errors
            .iter()
            .map(|error| match error {
                Value::String(raw) => raw.clone(),
                other => match other.get("message").and_then(Value::as_str) {
                    Some(message) if !message.is_empty() => message.to_owned(),
                    _ => other.to_string(),
                },
            })
            .collect::<Vec<_>>()
            .join(" ");

        Some(summary)
    }
}
