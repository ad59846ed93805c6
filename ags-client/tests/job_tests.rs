//! Integration tests for the GP job lifecycle against a scripted server.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ags_client::{ClientError, GpJob, JobStatus, MessageKind};

fn status_body(token: &str) -> serde_json::Value {
    json!({ "jobStatus": token })
}

async fn mount_submit(server: &MockServer, job_id: &str) {
    Mock::given(method("POST"))
        .and(path("/submitJob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobId": job_id })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn submit_and_wait_returns_results() {
    let server = MockServer::start().await;
    mount_submit(&server, "abc123").await;

    Mock::given(method("GET"))
        .and(path("/jobs/abc123"))
        .and(query_param("f", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobStatus": "esriJobSucceeded",
            "results": [
                { "paramName": "out", "dataType": "GPString", "value": "done" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    let status = job.submit_and_wait().await.unwrap();

    assert_eq!(status, JobStatus::Succeeded);
    assert_eq!(job.job_id(), Some("abc123"));
    assert_eq!(job.result("out").unwrap().value, json!("done"));
    assert_eq!(job.result("out").unwrap().data_type, "GPString");
}

#[tokio::test]
async fn submit_performs_one_post_and_one_get() {
    let server = MockServer::start().await;
    mount_submit(&server, "j1").await;

    Mock::given(method("GET"))
        .and(path("/jobs/j1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("esriJobExecuting")))
        .expect(1)
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    let status = job.submit().await.unwrap();

    // Non-terminal status comes back as-is; no extra polling.
    assert_eq!(status, JobStatus::Running);
    assert_eq!(job.status(), JobStatus::Running);
}

#[tokio::test]
async fn wait_polls_until_terminal() {
    let server = MockServer::start().await;
    mount_submit(&server, "j2").await;

    // Scripted sequence: waiting, executing, succeeded. One GET each.
    for token in ["esriJobWaiting", "esriJobExecuting"] {
        Mock::given(method("GET"))
            .and(path("/jobs/j2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(status_body(token)))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/jobs/j2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobStatus": "esriJobSucceeded",
            "messages": [
                { "type": "esriJobMessageTypeInformative", "description": "finished" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri()).poll_interval(Duration::from_millis(10));
    let status = job.submit_and_wait().await.unwrap();

    assert_eq!(status, JobStatus::Succeeded);
    assert_eq!(job.messages().len(), 1);
    assert_eq!(job.messages()[0].text, "finished");
}

#[tokio::test]
async fn each_poll_replaces_messages_and_results() {
    let server = MockServer::start().await;
    mount_submit(&server, "j3").await;

    Mock::given(method("GET"))
        .and(path("/jobs/j3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobStatus": "esriJobExecuting",
            "messages": [
                { "type": "esriJobMessageTypeInformative", "description": "step 1" },
                { "type": "esriJobMessageTypeInformative", "description": "step 2" }
            ]
        })))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/j3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobStatus": "esriJobSucceeded",
            "messages": [
                { "type": "esriJobMessageTypeWarning", "description": "step 3" }
            ]
        })))
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    job.submit().await.unwrap();
    assert_eq!(job.messages().len(), 2);

    job.poll_once().await.unwrap();
    assert_eq!(job.messages().len(), 2);

    // Latest snapshot wins; nothing accumulates across polls.
    job.poll_once().await.unwrap();
    assert_eq!(job.messages().len(), 1);
    assert_eq!(job.messages()[0].kind, MessageKind::Warning);
    assert_eq!(job.messages()[0].text, "step 3");
}

#[tokio::test]
async fn http_error_on_submit_leaves_job_unsubmitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submitJob"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    let err = job.submit().await.unwrap_err();

    assert!(matches!(err, ClientError::HttpStatus { status: 500 }));
    assert!(job.job_id().is_none());
    assert_eq!(job.status(), JobStatus::NotSubmitted);
}

#[tokio::test]
async fn invalid_json_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submitJob"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    let err = job.submit().await.unwrap_err();

    assert!(matches!(err, ClientError::Protocol(_)));
}

#[tokio::test]
async fn missing_job_id_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submitJob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    let err = job.submit().await.unwrap_err();

    match err {
        ClientError::Protocol(message) => assert!(message.contains("jobId")),
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert!(job.job_id().is_none());
}

#[tokio::test]
async fn unknown_status_token_is_fatal() {
    let server = MockServer::start().await;
    mount_submit(&server, "j4").await;

    Mock::given(method("GET"))
        .and(path("/jobs/j4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("esriJobMysterious")))
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri());
    let err = job.submit().await.unwrap_err();

    match err {
        ClientError::UnknownStatus(token) => assert_eq!(token, "esriJobMysterious"),
        other => panic!("expected unknown status error, got {other:?}"),
    }
}

#[tokio::test]
async fn execute_reports_failure_without_raising() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 400, "message": "invalid distance" },
            "messages": [
                { "type": "esriJobMessageTypeError", "description": "invalid distance" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri()).parameter("distance", "-1");
    let status = job.execute().await.unwrap();

    assert_eq!(status, JobStatus::Failed);
    assert_eq!(job.messages().len(), 1);
    assert_eq!(job.messages()[0].kind, MessageKind::Error);
    assert!(job.results().is_empty());
}

#[tokio::test]
async fn execute_success_populates_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_string_contains("f=json"))
        .and(body_string_contains("returnZ=true"))
        .and(body_string_contains("distance=100"))
        .and(body_string_contains("env%3AoutputSR=4326"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [],
            "results": [
                { "paramName": "area", "dataType": "GPDouble", "value": 12.5 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri())
        .parameter("distance", "100")
        .output_spatial_reference("4326")
        .return_z(true);
    let status = job.execute().await.unwrap();

    assert_eq!(status, JobStatus::Succeeded);
    assert_eq!(job.result("area").unwrap().value, json!(12.5));
}

#[tokio::test]
async fn wait_honors_poll_timeout() {
    let server = MockServer::start().await;
    mount_submit(&server, "j5").await;

    // Never terminates on its own.
    Mock::given(method("GET"))
        .and(path("/jobs/j5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("esriJobExecuting")))
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri())
        .poll_interval(Duration::from_millis(5))
        .poll_timeout(Duration::from_millis(25));
    let err = job.submit_and_wait().await.unwrap_err();

    assert!(matches!(err, ClientError::PollTimeout));
    assert_eq!(job.status(), JobStatus::Running);
}

#[tokio::test]
async fn wait_can_be_cancelled() {
    let server = MockServer::start().await;
    mount_submit(&server, "j6").await;

    Mock::given(method("GET"))
        .and(path("/jobs/j6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("esriJobExecuting")))
        .mount(&server)
        .await;

    let mut job = GpJob::new(server.uri()).poll_interval(Duration::from_secs(60));
    job.submit().await.unwrap();

    let token = CancellationToken::new();
    token.cancel();

    let err = job.wait_with_cancel(&token).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    // The last observed status survives the cancelled wait.
    assert_eq!(job.status(), JobStatus::Running);
}
