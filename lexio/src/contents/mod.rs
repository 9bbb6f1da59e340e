//! Content extraction: synchronous requests and async job lifecycle.
//!
//! A contents request either completes inline (HTTP 200 with results) or is
//! accepted as an async job (HTTP 202 with a `job_id`). Async jobs are
//! observed by polling [`Lexio::get_contents_job`], most conveniently via
//! [`Lexio::wait_for_contents_job`], or by receiving the completion webhook
//! (see [`crate::webhooks`]).

pub mod types;

use serde_json::{json, Value};
use tracing::warn;

use crate::client::Lexio;
use crate::config::PollConfig;
use crate::errors::{LexioError, Result, ValidationError};
use crate::poller::{poll_until_terminal, PollError, ProgressFn};
use crate::transport::Method;
use crate::CancellationToken;

pub use types::{
    ContentsFailure, ContentsJobCreateResponse, ContentsJobStatus, ContentsResponse,
    ContentsResult, ContentsSuccess, ExtractEffort, JobStatus, LengthPreset, ResponseLength,
};

/// Most URLs a single request may carry.
pub const MAX_URLS_PER_REQUEST: usize = 50;

/// Most URLs a synchronous request may carry; beyond this, async mode is
/// required.
pub const MAX_SYNC_URLS: usize = 10;

/// Longest accepted summary instruction, in characters.
const MAX_SUMMARY_INSTRUCTION_CHARS: usize = 500;

/// A content extraction request, built up fluently.
///
/// ```no_run
/// use lexio::contents::ContentsRequest;
///
/// let request = ContentsRequest::new(["https://example.com/article"])
///     .with_summary_instructions("Key findings only")
///     .with_screenshot(true);
/// ```
#[derive(Debug, Clone)]
pub struct ContentsRequest {
    urls: Vec<String>,
    summary: Option<Value>,
    extract_effort: Option<ExtractEffort>,
    response_length: Option<ResponseLength>,
    max_price_dollars: Option<f64>,
    screenshot: bool,
    async_mode: bool,
    webhook_url: Option<String>,
    wait: bool,
    poll: Option<PollConfig>,
}

impl ContentsRequest {
    /// Creates a request for the given URLs.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            summary: None,
            extract_effort: None,
            response_length: None,
            max_price_dollars: None,
            screenshot: false,
            async_mode: false,
            webhook_url: None,
            wait: false,
            poll: None,
        }
    }

    /// Requests basic automatic summarization.
    #[must_use]
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.summary = Some(Value::Bool(enabled));
        self
    }

    /// Requests summarization following custom instructions (max 500 chars).
    #[must_use]
    pub fn with_summary_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.summary = Some(Value::String(instructions.into()));
        self
    }

    /// Requests structured extraction against a JSON schema.
    #[must_use]
    pub fn with_summary_schema(mut self, schema: Value) -> Self {
        self.summary = Some(schema);
        self
    }

    /// Sets extraction thoroughness.
    #[must_use]
    pub fn with_extract_effort(mut self, effort: ExtractEffort) -> Self {
        self.extract_effort = Some(effort);
        self
    }

    /// Caps the content length per URL.
    #[must_use]
    pub fn with_response_length(mut self, length: ResponseLength) -> Self {
        self.response_length = Some(length);
        self
    }

    /// Caps the total cost of the request.
    #[must_use]
    pub fn with_max_price_dollars(mut self, dollars: f64) -> Self {
        self.max_price_dollars = Some(dollars);
        self
    }

    /// Requests a page screenshot per URL.
    #[must_use]
    pub fn with_screenshot(mut self, screenshot: bool) -> Self {
        self.screenshot = screenshot;
        self
    }

    /// Submits as an async job instead of waiting inline. Required for more
    /// than [`MAX_SYNC_URLS`] URLs.
    #[must_use]
    pub fn with_async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// Sets an HTTPS URL to notify when the async job finishes. Implies
    /// nothing about polling; both can be used together.
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// When the request is async, poll until terminal and return the final
    /// job status instead of the acceptance response.
    #[must_use]
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    /// Overrides the client's polling configuration for this request.
    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = Some(poll);
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.urls.is_empty() {
            return Err(ValidationError::new("at least one URL is required").with_field("urls"));
        }
        if self.urls.len() > MAX_URLS_PER_REQUEST {
            return Err(ValidationError::new(format!(
                "maximum {MAX_URLS_PER_REQUEST} URLs allowed per request (got {})",
                self.urls.len()
            ))
            .with_field("urls"));
        }
        if self.urls.len() > MAX_SYNC_URLS && !self.async_mode {
            return Err(ValidationError::new(format!(
                "requests with more than {MAX_SYNC_URLS} URLs require async mode (got {})",
                self.urls.len()
            ))
            .with_field("async_mode"));
        }
        if let Some(url) = &self.webhook_url {
            if !self.async_mode {
                return Err(
                    ValidationError::new("webhook_url requires async mode")
                        .with_field("webhook_url"),
                );
            }
            if !url.starts_with("https://") {
                return Err(ValidationError::new("webhook_url must use https")
                    .with_field("webhook_url"));
            }
        }
        if let Some(Value::String(instructions)) = &self.summary {
            if instructions.chars().count() > MAX_SUMMARY_INSTRUCTION_CHARS {
                return Err(ValidationError::new(format!(
                    "summary instructions exceed {MAX_SUMMARY_INSTRUCTION_CHARS} characters"
                ))
                .with_field("summary"));
            }
        }
        Ok(())
    }

    fn payload(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("urls".to_string(), json!(self.urls));
        if self.async_mode {
            map.insert("async".to_string(), Value::Bool(true));
        }
        if let Some(summary) = &self.summary {
            map.insert("summary".to_string(), summary.clone());
        }
        if let Some(effort) = self.extract_effort {
            map.insert("extract_effort".to_string(), json!(effort));
        }
        if let Some(length) = self.response_length {
            map.insert("response_length".to_string(), json!(length));
        }
        if let Some(price) = self.max_price_dollars {
            map.insert("max_price_dollars".to_string(), json!(price));
        }
        if self.screenshot {
            map.insert("screenshot".to_string(), Value::Bool(true));
        }
        if let Some(url) = &self.webhook_url {
            map.insert("webhook_url".to_string(), Value::String(url.clone()));
        }
        Value::Object(map)
    }
}

/// What a contents request produced, depending on its mode.
#[derive(Debug, Clone)]
pub enum ContentsOutcome {
    /// Synchronous request: final results inline.
    Sync(ContentsResponse),
    /// Async request without `wait`: the accepted job.
    Job(ContentsJobCreateResponse),
    /// Async request with `wait`: the terminal job status after polling.
    Finished(Box<ContentsJobStatus>),
}

impl Lexio {
    /// Extracts content from web pages.
    ///
    /// Validation failures (empty URL list, too many URLs, sync request over
    /// the async threshold, non-HTTPS webhook) are rejected before any
    /// network traffic. Per-URL extraction failures are reported in-band as
    /// [`ContentsResult::Failed`] entries, not as errors.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed request, a transport error
    /// for connection failures, or an API error for non-2xx responses.
    pub async fn contents(&self, request: &ContentsRequest) -> Result<ContentsOutcome> {
        request.validate()?;
        if request.wait && !request.async_mode {
            warn!("wait requested on a synchronous contents request; results are already final");
        }

        let payload = request.payload();
        let response = self
            .transport()
            .issue(Method::Post, "/contents", &[], Some(&payload))
            .await?;

        if !response.is_success() {
            return Err(LexioError::api(response.status, response.error_message()));
        }

        if response.is_accepted() {
            let job: ContentsJobCreateResponse = serde_json::from_value(response.body)?;
            if request.wait && job.success {
                let status = self
                    .wait_for_contents_job(&job.job_id, request.poll, None, None)
                    .await
                    .map_err(PollError::into_client_error)?;
                return Ok(ContentsOutcome::Finished(Box::new(status)));
            }
            return Ok(ContentsOutcome::Job(job));
        }

        let sync: ContentsResponse = serde_json::from_value(response.body)?;
        Ok(ContentsOutcome::Sync(sync))
    }

    /// Fetches the current status of an async contents job.
    ///
    /// # Errors
    ///
    /// Returns [`LexioError::TaskNotFound`] for an unknown job id, an API
    /// error for other non-2xx responses, or a transport error.
    pub async fn get_contents_job(&self, job_id: &str) -> Result<ContentsJobStatus> {
        let path = format!("/contents/jobs/{job_id}");
        let response = self
            .transport()
            .issue(Method::Get, &path, &[], None)
            .await?;

        if response.status == 404 {
            return Err(LexioError::task_not_found(job_id));
        }
        if !response.is_success() {
            return Err(LexioError::api(response.status, response.error_message()));
        }

        Ok(serde_json::from_value(response.body)?)
    }

    /// Polls an async contents job until it reaches a terminal state.
    ///
    /// Terminal here means completed, partial, failed, or cancelled; a job
    /// that finishes badly is still returned as `Ok` so the caller can
    /// inspect per-URL outcomes and the job-level error. `poll` overrides the
    /// client's [`PollConfig`]; `on_progress` sees every snapshot in fetch
    /// order; `cancel` stops the wait without affecting the remote job.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Timeout`] with the last-seen snapshot when the
    /// deadline elapses, [`PollError::Cancelled`] when the token fires, or
    /// [`PollError::Client`] for fetch failures.
    pub async fn wait_for_contents_job(
        &self,
        job_id: &str,
        poll: Option<PollConfig>,
        on_progress: Option<ProgressFn<'_, ContentsJobStatus>>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ContentsJobStatus, PollError<ContentsJobStatus>> {
        let config = poll.unwrap_or(self.config().poll);
        let fetch = || async {
            let status = self.get_contents_job(job_id).await?;
            if !status.success {
                return Err(LexioError::api(
                    200,
                    status
                        .error
                        .unwrap_or_else(|| "job status fetch reported failure".to_string()),
                ));
            }
            Ok(status)
        };
        poll_until_terminal(fetch, &config, on_progress, cancel).await
    }
}
