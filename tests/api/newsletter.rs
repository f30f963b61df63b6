use std::time::Duration;

use serde_json::json;
use site_forms::domain::endpoint::Endpoint;
use site_forms::domain::outcome::Outcome;
use wiremock::{
    matchers::{body_json, body_string_contains, header, method, path},
    Mock, ResponseTemplate,
};

use crate::helper::{is_json_body, spawn_app, RenderEvent};

const FORM_PATH: &str = "/f/mqkrzjwb";
const FAILURE_MESSAGE: &str = "Subscription failed — please try again later.";

#[tokio::test]
async fn malformed_emails_are_rejected_without_any_io() {
    let app = spawn_app().await;
    let test_cases = [
        ("ursuladomain.com", "missing the @"),
        ("ursula@domain", "missing the domain dot"),
        ("urs ula@domain.com", "containing whitespace"),
        ("   ", "blank"),
    ];

    for (email, description) in test_cases {
        for endpoint in [Endpoint::Demo, app.remote()] {
            let report = app.submit_newsletter(email, &endpoint).await;
            assert_eq!(
                report.outcome,
                Outcome::ValidationRejected,
                "The email was not rejected when it was {}",
                description
            );
            assert_eq!(report.message, "Please enter a valid email address.");
        }
    }

    assert!(app.received_requests().await.is_empty());
    assert!(app.stored("ef_news").await.is_empty());
    assert!(app.renderer.busy_history().is_empty());
}

#[tokio::test]
async fn demo_mode_appends_one_record() {
    let app = spawn_app().await;
    let before = chrono::Utc::now().timestamp_millis();

    let report = app
        .submit_newsletter(" ursula@domain.com ", &Endpoint::Demo)
        .await;

    assert_eq!(report.outcome, Outcome::DemoStored);
    assert_eq!(
        report.message,
        "Thanks! You’re subscribed (demo). Replace data-endpoint with your API URL to receive real submissions."
    );
    let stored = app.stored("ef_news").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].fields["email"], "ursula@domain.com");
    assert!(stored[0].time >= before);
    assert!(app.renderer.was_cleared());
    assert!(app.received_requests().await.is_empty());
}

#[tokio::test]
async fn placeholder_endpoint_is_never_called() {
    let app = spawn_app().await;
    let placeholder_url = format!("{}/f/your-id", app.form_server.uri());
    let placeholder = Endpoint::resolve(Some(placeholder_url.as_str()), None);

    let report = app.submit_newsletter("ursula@domain.com", &placeholder).await;

    assert_eq!(report.outcome, Outcome::DemoStored);
    assert!(app.received_requests().await.is_empty());
    assert_eq!(app.stored("ef_news").await.len(), 1);
}

#[tokio::test]
async fn identical_demo_submissions_are_all_kept() {
    let app = spawn_app().await;

    for _ in 0..3 {
        app.submit_newsletter("ursula@domain.com", &Endpoint::Demo)
            .await;
    }

    let stored = app.stored("ef_news").await;
    assert_eq!(stored.len(), 3);
    assert!(stored
        .iter()
        .all(|record| record.fields["email"] == "ursula@domain.com"));
}

#[tokio::test]
async fn accepted_submission_clears_the_field() {
    let app = spawn_app().await;

    Mock::given(path(FORM_PATH))
        .and(method("POST"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("form-data"))
        .and(body_string_contains("_replyto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&app.form_server)
        .await;

    let report = app
        .submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    assert_eq!(report.outcome, Outcome::RemoteAccepted);
    assert_eq!(report.message, "Thanks! You’re subscribed.");
    assert!(app.renderer.was_cleared());
    assert!(app.stored("ef_news").await.is_empty());
}

#[tokio::test]
async fn busy_brackets_the_request() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.form_server)
        .await;

    app.submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    let events = app.renderer.events();
    assert_eq!(events.first(), Some(&RenderEvent::Busy(true)));
    assert_eq!(events[1], RenderEvent::Progress("Sending…".into()));
    assert_eq!(events.last(), Some(&RenderEvent::Busy(false)));
    assert_eq!(app.renderer.busy_history(), vec![true, false]);
}

#[tokio::test]
async fn method_not_allowed_is_retried_once_as_json() {
    let app = spawn_app().await;

    Mock::given(path(FORM_PATH))
        .and(method("POST"))
        .and(header("accept", "application/json"))
        .and(body_string_contains("form-data"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&app.form_server)
        .await;

    Mock::given(path(FORM_PATH))
        .and(method("POST"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "email": "ursula@domain.com",
            "_replyto": "ursula@domain.com",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.form_server)
        .await;

    let report = app
        .submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    assert_eq!(report.outcome, Outcome::RemoteAccepted);
    let requests = app.received_requests().await;
    assert_eq!(requests.len(), 2);
    assert!(!is_json_body(&requests[0]));
    assert!(is_json_body(&requests[1]));
    assert!(app.renderer.was_cleared());
}

#[tokio::test]
async fn a_second_method_not_allowed_is_not_retried_again() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(405))
        .expect(2)
        .mount(&app.form_server)
        .await;

    let report = app
        .submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    assert_eq!(report.outcome, Outcome::RemoteOtherError);
    assert_eq!(report.message, FAILURE_MESSAGE);
}

#[tokio::test]
async fn unprocessable_entity_shows_the_server_errors() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"errors": [{"message": "bad"}]})),
        )
        .expect(1)
        .mount(&app.form_server)
        .await;

    let report = app
        .submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    assert_eq!(report.outcome, Outcome::RemoteValidationError);
    assert_eq!(report.message, "bad");
    assert!(!app.renderer.was_cleared());
    assert!(app.renderer.events().contains(&RenderEvent::Status(
        Outcome::RemoteValidationError,
        "bad".into()
    )));
}

#[tokio::test]
async fn network_failure_makes_exactly_one_attempt() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&app.form_server)
        .await;

    let report = app
        .submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    assert_eq!(report.outcome, Outcome::NetworkError);
    assert_eq!(report.message, FAILURE_MESSAGE);
    assert_eq!(app.received_requests().await.len(), 1);
    assert_eq!(app.renderer.busy_history(), vec![true, false]);
    assert!(!app.renderer.was_cleared());
}

#[tokio::test]
async fn network_failure_on_the_retry_is_another_error_and_releases_busy() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(body_string_contains("form-data"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&app.form_server)
        .await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "email": "ursula@domain.com",
            "_replyto": "ursula@domain.com",
        })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&app.form_server)
        .await;

    let report = app
        .submit_newsletter("ursula@domain.com", &app.remote())
        .await;

    assert_eq!(report.outcome, Outcome::RemoteOtherError);
    assert_eq!(report.message, FAILURE_MESSAGE);
    assert_eq!(app.received_requests().await.len(), 2);
    assert_eq!(app.renderer.busy_history(), vec![true, false]);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let app = spawn_app().await;
    // Nothing listens on the discard port.
    let endpoint = Endpoint::Remote("http://127.0.0.1:9/f/mqkrzjwb".into());

    let report = app.submit_newsletter("ursula@domain.com", &endpoint).await;

    assert_eq!(report.outcome, Outcome::NetworkError);
    assert_eq!(app.renderer.busy_history(), vec![true, false]);
}
