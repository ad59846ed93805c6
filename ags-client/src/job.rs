//! Geoprocessing job handle
//!
//! [`GpJob`] is an owned, exclusively-mutable proxy for one server-side GP
//! task execution. It submits the task, polls the job endpoint, and keeps
//! the latest status/messages/results snapshot. The server drives every
//! state transition; the client only translates status tokens.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ags_core::domain::job::{JobMessage, JobStatus, TaskResult};
use ags_core::dto::job::{
    ExecuteResponse, JobStatusResponse, SubmitJobResponse, collect_messages, collect_results,
};

use crate::error::{ClientError, Result};

/// Default delay between status polls, matching the server-recommended
/// cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Client-side handle for a geoprocessing task execution
///
/// Target URL and input parameters are fixed at construction time through
/// the builder methods; everything else is filled in from server responses
/// as the job advances.
///
/// Re-submitting a handle that already holds a job id creates an orphaned
/// job on the server. Nothing enforces single submission; that is a caller
/// responsibility.
///
/// # Example
/// ```no_run
/// use ags_client::GpJob;
///
/// # async fn example() -> ags_client::Result<()> {
/// let mut job = GpJob::new("https://gis.example.com/arcgis/rest/services/Buffer/GPServer/Buffer")
///     .parameter("distance", "100")
///     .return_z(true);
///
/// let status = job.submit_and_wait().await?;
/// println!("finished: {status}");
/// for message in job.messages() {
///     println!("  {message}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GpJob {
    service_url: String,
    http: Client,

    parameters: HashMap<String, String>,
    output_spatial_reference: Option<String>,
    process_spatial_reference: Option<String>,
    return_z: bool,
    return_m: bool,

    poll_interval: Duration,
    poll_timeout: Option<Duration>,

    job_id: Option<String>,
    status: JobStatus,
    messages: Vec<JobMessage>,
    results: HashMap<String, TaskResult>,
}

impl GpJob {
    /// Create a job handle for a GP task URL
    ///
    /// # Arguments
    /// * `service_url` - Task endpoint, e.g.
    ///   `https://host/arcgis/rest/services/Name/GPServer/Task`
    pub fn new(service_url: impl Into<String>) -> Self {
        Self::with_client(service_url, Client::new())
    }

    /// Create a job handle with a custom HTTP client
    ///
    /// Use this to configure timeouts, proxies, or TLS settings.
    pub fn with_client(service_url: impl Into<String>, http: Client) -> Self {
        let service_url = service_url.into();
        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            http,
            parameters: HashMap::new(),
            output_spatial_reference: None,
            process_spatial_reference: None,
            return_z: false,
            return_m: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: None,
            job_id: None,
            status: JobStatus::NotSubmitted,
            messages: Vec::new(),
            results: HashMap::new(),
        }
    }

    /// Attach to a job submitted elsewhere
    ///
    /// The handle starts at `Submitted` with an empty snapshot; the first
    /// poll refreshes both from the server.
    pub fn attach(service_url: impl Into<String>, job_id: impl Into<String>) -> Self {
        let mut job = Self::new(service_url);
        job.job_id = Some(job_id.into());
        job.status = JobStatus::Submitted;
        job
    }

    // =============================================================================
    // Builder methods (pre-submission configuration)
    // =============================================================================

    /// Set one input parameter
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Set several input parameters at once
    pub fn parameters<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the output spatial reference (`env:outputSR`)
    pub fn output_spatial_reference(mut self, sr: impl Into<String>) -> Self {
        self.output_spatial_reference = Some(sr.into());
        self
    }

    /// Override the processing spatial reference (`env:processSR`)
    pub fn process_spatial_reference(mut self, sr: impl Into<String>) -> Self {
        self.process_spatial_reference = Some(sr.into());
        self
    }

    /// Request Z values in the output geometry
    pub fn return_z(mut self, enabled: bool) -> Self {
        self.return_z = enabled;
        self
    }

    /// Request M values in the output geometry
    pub fn return_m(mut self, enabled: bool) -> Self {
        self.return_m = enabled;
        self
    }

    /// Set the delay between status polls (default 1 second)
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bound how long [`GpJob::wait`] may keep polling (default unbounded,
    /// matching historical behavior)
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    // =============================================================================
    // Accessors
    // =============================================================================

    /// Task endpoint this job targets
    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Server-assigned job identifier, `None` until submitted
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Current lifecycle status
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Messages from the most recent poll (or `execute` call)
    pub fn messages(&self) -> &[JobMessage] {
        &self.messages
    }

    /// Output values keyed by parameter name
    ///
    /// Non-empty only once the server reports the job succeeded.
    pub fn results(&self) -> &HashMap<String, TaskResult> {
        &self.results
    }

    /// Look up a single output value by parameter name
    pub fn result(&self, name: &str) -> Option<&TaskResult> {
        self.results.get(name)
    }

    // =============================================================================
    // Job lifecycle
    // =============================================================================

    /// Submit the task and poll its status once
    ///
    /// The returned status may be non-terminal; follow up with
    /// [`GpJob::poll_once`] or [`GpJob::wait`].
    pub async fn submit(&mut self) -> Result<JobStatus> {
        self.submit_job().await?;
        self.poll_once().await
    }

    /// Submit the task and poll until it reaches a terminal state
    pub async fn submit_and_wait(&mut self) -> Result<JobStatus> {
        self.submit_job().await?;
        self.wait().await
    }

    /// Poll the job endpoint exactly once and refresh the snapshot
    ///
    /// Replaces `messages` and `results` wholesale; each poll response is
    /// authoritative for the current state of the job.
    pub async fn poll_once(&mut self) -> Result<JobStatus> {
        let job_id = self.job_id.clone().ok_or(ClientError::NotSubmitted)?;

        let url = format!("{}/jobs/{}", self.service_url, job_id);
        let response = self
            .http
            .get(&url)
            .query(&[("f", "json")])
            .send()
            .await?;
        let body: JobStatusResponse = Self::parse_response(response).await?;

        let token = body
            .job_status
            .as_deref()
            .ok_or_else(|| ClientError::protocol("server response is missing 'jobStatus'"))?;
        let status = JobStatus::from_token(token)
            .ok_or_else(|| ClientError::UnknownStatus(token.to_string()))?;

        self.status = status;
        self.messages = collect_messages(body.messages.as_ref());
        self.results = collect_results(body.results.as_ref());

        debug!(job_id = %job_id, status = %status, "polled job");
        Ok(status)
    }

    /// Poll until the job reaches a terminal state
    ///
    /// Sleeps [`poll_interval`](GpJob::poll_interval) between polls. If a
    /// [`poll_timeout`](GpJob::poll_timeout) is configured and exceeded at
    /// a retry boundary, fails with [`ClientError::PollTimeout`]; without
    /// one this polls indefinitely.
    pub async fn wait(&mut self) -> Result<JobStatus> {
        self.wait_inner(None).await
    }

    /// Poll until terminal, honoring a cancellation token
    ///
    /// The token is checked at each retry boundary; cancellation turns a
    /// pending wait into [`ClientError::Cancelled`] instead of leaving the
    /// caller blocked. The server-side job keeps running.
    pub async fn wait_with_cancel(&mut self, cancel: &CancellationToken) -> Result<JobStatus> {
        self.wait_inner(Some(cancel)).await
    }

    async fn wait_inner(&mut self, cancel: Option<&CancellationToken>) -> Result<JobStatus> {
        let deadline = self.poll_timeout.map(|timeout| Instant::now() + timeout);

        loop {
            let status = self.poll_once().await?;
            if status.is_terminal() {
                info!(job_id = ?self.job_id, status = %status, "job reached terminal state");
                return Ok(status);
            }

            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                return Err(ClientError::PollTimeout);
            }

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(ClientError::Cancelled),
                        _ = sleep(self.poll_interval) => {}
                    }
                }
                None => sleep(self.poll_interval).await,
            }
        }
    }

    /// Run the task synchronously via the `execute` endpoint
    ///
    /// Single-shot; no job id is involved. A body carrying a top-level
    /// `error` is a *reported* failure: the status becomes `Failed`,
    /// messages are populated, and this still returns `Ok`. Callers must
    /// inspect the returned status.
    pub async fn execute(&mut self) -> Result<JobStatus> {
        let body: ExecuteResponse = self.post_form("execute").await?;

        if body.is_error() {
            self.status = JobStatus::Failed;
            self.messages = collect_messages(body.messages.as_ref());
            self.results.clear();
            info!(url = %self.service_url, "task execution reported an error");
            return Ok(self.status);
        }

        self.status = JobStatus::Succeeded;
        self.messages = collect_messages(body.messages.as_ref());
        self.results = collect_results(body.results.as_ref());
        Ok(self.status)
    }

    // =============================================================================
    // Request plumbing
    // =============================================================================

    /// POST the submit payload to `submitJob` and record the job id
    async fn submit_job(&mut self) -> Result<()> {
        let body: SubmitJobResponse = self.post_form("submitJob").await?;
        let job_id = body
            .job_id
            .ok_or_else(|| ClientError::protocol("server response is missing 'jobId'"))?;

        info!(job_id = %job_id, url = %self.service_url, "submitted geoprocessing job");
        self.job_id = Some(job_id);
        Ok(())
    }

    /// Form fields shared by `submitJob` and `execute`
    fn request_payload(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("f".to_string(), "json".to_string()),
            ("returnZ".to_string(), self.return_z.to_string()),
            ("returnM".to_string(), self.return_m.to_string()),
        ];
        for (name, value) in &self.parameters {
            form.push((name.clone(), value.clone()));
        }
        if let Some(sr) = &self.output_spatial_reference {
            form.push(("env:outputSR".to_string(), sr.clone()));
        }
        if let Some(sr) = &self.process_spatial_reference {
            form.push(("env:processSR".to_string(), sr.clone()));
        }
        form
    }

    async fn post_form<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/{}", self.service_url, endpoint);
        let response = self
            .http
            .post(&url)
            .form(&self.request_payload())
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Validate the HTTP status and decode the JSON body
    ///
    /// Status outside [200, 300) maps to [`ClientError::HttpStatus`]; a
    /// body that is not valid JSON (or not the expected shape at the top
    /// level) maps to [`ClientError::Protocol`].
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::http_status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|_| ClientError::protocol("server did not return a valid JSON response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_new_job_is_unsubmitted() {
        let job = GpJob::new("http://gis.example.com/GPServer/Buffer");
        assert_eq!(job.status(), JobStatus::NotSubmitted);
        assert!(job.job_id().is_none());
        assert!(job.messages().is_empty());
        assert!(job.results().is_empty());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let job = GpJob::new("http://gis.example.com/GPServer/Buffer/");
        assert_eq!(job.service_url(), "http://gis.example.com/GPServer/Buffer");
    }

    #[test]
    fn test_payload_defaults() {
        let job = GpJob::new("http://gis.example.com/GPServer/Buffer");
        let form = job.request_payload();

        assert_eq!(field(&form, "f"), Some("json"));
        assert_eq!(field(&form, "returnZ"), Some("false"));
        assert_eq!(field(&form, "returnM"), Some("false"));
        assert_eq!(field(&form, "env:outputSR"), None);
        assert_eq!(field(&form, "env:processSR"), None);
    }

    #[test]
    fn test_payload_carries_parameters_and_overrides() {
        let job = GpJob::new("http://gis.example.com/GPServer/Buffer")
            .parameter("distance", "100")
            .parameters([("units", "meters")])
            .output_spatial_reference("4326")
            .process_spatial_reference("3857")
            .return_z(true);
        let form = job.request_payload();

        assert_eq!(field(&form, "distance"), Some("100"));
        assert_eq!(field(&form, "units"), Some("meters"));
        assert_eq!(field(&form, "env:outputSR"), Some("4326"));
        assert_eq!(field(&form, "env:processSR"), Some("3857"));
        assert_eq!(field(&form, "returnZ"), Some("true"));
        assert_eq!(field(&form, "returnM"), Some("false"));
    }

    #[tokio::test]
    async fn test_poll_before_submit_fails_fast() {
        let mut job = GpJob::new("http://gis.example.com/GPServer/Buffer");
        let err = job.poll_once().await.unwrap_err();
        assert!(matches!(err, ClientError::NotSubmitted));

        let err = job.wait().await.unwrap_err();
        assert!(matches!(err, ClientError::NotSubmitted));
    }
}
