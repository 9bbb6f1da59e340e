//! Deep research tasks: multi-step agentic research over web and
//! proprietary sources.
//!
//! Tasks are created, then observed by polling their status, waiting for
//! completion, or streaming incremental updates through a [`TaskObserver`].
//! Running tasks accept follow-up instructions and can be cancelled; finished
//! tasks can be deleted or published.

pub mod types;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::client::Lexio;
use crate::config::PollConfig;
use crate::errors::{LexioError, Result, ValidationError};
use crate::poller::{poll_until_terminal, PollError, ProgressFn};
use crate::transport::{Method, RawResponse};
use crate::CancellationToken;

pub use types::{
    FormatPreset, OutputFormat, OutputType, Progress, ResearchActionResponse,
    ResearchCreateResponse, ResearchListResponse, ResearchMode, ResearchSearchConfig,
    ResearchSource, ResearchStatus, ResearchStatusResponse, ResearchTaskSummary,
    TogglePublicResponse,
};

/// Most previous report ids a task may reference for context.
pub const MAX_PREVIOUS_REPORTS: usize = 3;

/// List endpoint page-size bounds.
const LIST_LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// A research task creation request, built up fluently.
#[derive(Debug, Clone)]
pub struct ResearchRequest {
    query: String,
    mode: Option<ResearchMode>,
    output_formats: Option<Vec<OutputFormat>>,
    strategy: Option<String>,
    search: Option<ResearchSearchConfig>,
    urls: Option<Vec<String>>,
    code_execution: Option<bool>,
    previous_reports: Option<Vec<String>>,
    webhook_url: Option<String>,
    metadata: Option<Map<String, Value>>,
}

impl ResearchRequest {
    /// Creates a request for the given research query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: None,
            output_formats: None,
            strategy: None,
            search: None,
            urls: None,
            code_execution: None,
            previous_reports: None,
            webhook_url: None,
            metadata: None,
        }
    }

    /// Sets the effort mode. Defaults to standard server-side.
    #[must_use]
    pub fn with_mode(mut self, mode: ResearchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the requested output formats.
    #[must_use]
    pub fn with_output_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.output_formats = Some(formats);
        self
    }

    /// Sets a natural-language strategy for the research.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Scopes the searches the task performs.
    #[must_use]
    pub fn with_search(mut self, search: ResearchSearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    /// Adds URLs to extract and analyze as part of the research.
    #[must_use]
    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    /// Enables or disables code execution during research.
    #[must_use]
    pub fn with_code_execution(mut self, enabled: bool) -> Self {
        self.code_execution = Some(enabled);
        self
    }

    /// References previous report ids for context (max
    /// [`MAX_PREVIOUS_REPORTS`]).
    #[must_use]
    pub fn with_previous_reports<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.previous_reports = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Sets an HTTPS URL to notify when the task finishes.
    #[must_use]
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Attaches caller-defined metadata, echoed back in status responses.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(
                ValidationError::new("query is required and cannot be empty").with_field("query"),
            );
        }
        if let Some(reports) = &self.previous_reports {
            if reports.len() > MAX_PREVIOUS_REPORTS {
                return Err(ValidationError::new(format!(
                    "at most {MAX_PREVIOUS_REPORTS} previous reports may be referenced (got {})",
                    reports.len()
                ))
                .with_field("previous_reports"));
            }
        }
        if let Some(url) = &self.webhook_url {
            if !url.starts_with("https://") {
                return Err(
                    ValidationError::new("webhook_url must use https").with_field("webhook_url")
                );
            }
        }
        if let Some(formats) = &self.output_formats {
            let has_schema = formats
                .iter()
                .any(|f| matches!(f, OutputFormat::Schema(_)));
            if has_schema && formats.len() > 1 {
                return Err(ValidationError::new(
                    "a JSON schema output cannot be combined with other formats",
                )
                .with_field("output_formats"));
            }
        }
        Ok(())
    }

    fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(mode) = self.mode {
            map.insert("mode".to_string(), json!(mode));
        }
        if let Some(formats) = &self.output_formats {
            map.insert("output_formats".to_string(), json!(formats));
        }
        if let Some(strategy) = &self.strategy {
            map.insert("strategy".to_string(), Value::String(strategy.clone()));
        }
        if let Some(search) = &self.search {
            map.insert("search".to_string(), json!(search));
        }
        if let Some(urls) = &self.urls {
            map.insert("urls".to_string(), json!(urls));
        }
        if let Some(enabled) = self.code_execution {
            map.insert("code_execution".to_string(), Value::Bool(enabled));
        }
        if let Some(reports) = &self.previous_reports {
            map.insert("previous_reports".to_string(), json!(reports));
        }
        if let Some(url) = &self.webhook_url {
            map.insert("webhook_url".to_string(), Value::String(url.clone()));
        }
        if let Some(metadata) = &self.metadata {
            map.insert("metadata".to_string(), Value::Object(metadata.clone()));
        }
        Value::Object(map)
    }
}

/// Observer for streaming task updates through [`ResearchClient::stream`].
///
/// All methods default to no-ops; implement only what you need. Callbacks
/// run on the polling task and panics in them are isolated.
pub trait TaskObserver: Send + Sync {
    /// Called when the task reports step progress.
    fn on_progress(&self, current_step: u32, total_steps: u32) {
        let _ = (current_step, total_steps);
    }

    /// Called once per new activity message, in order. Messages already
    /// delivered are never repeated.
    fn on_message(&self, message: &Value) {
        let _ = message;
    }

    /// Called exactly once, with the final status, when the task completes
    /// successfully.
    fn on_complete(&self, status: &ResearchStatusResponse) {
        let _ = status;
    }
}

/// Client for the Research API, obtained via [`Lexio::research`].
#[derive(Debug, Clone, Copy)]
pub struct ResearchClient<'a> {
    client: &'a Lexio,
}

impl<'a> ResearchClient<'a> {
    pub(crate) fn new(client: &'a Lexio) -> Self {
        Self { client }
    }

    /// Creates a new research task.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty query or malformed request
    /// options, a transport error, or an API error for non-2xx responses.
    pub async fn create(&self, request: &ResearchRequest) -> Result<ResearchCreateResponse> {
        request.validate()?;
        let payload = request.payload();
        let response = self
            .client
            .transport()
            .issue(Method::Post, "/research/tasks", &[], Some(&payload))
            .await?;
        if !response.is_success() {
            return Err(LexioError::api(response.status, response.error_message()));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Fetches the current status of a task.
    ///
    /// # Errors
    ///
    /// Returns [`LexioError::TaskNotFound`] for an unknown id, an API error
    /// for other non-2xx responses, or a transport error.
    pub async fn status(&self, task_id: &str) -> Result<ResearchStatusResponse> {
        let path = format!("/research/tasks/{task_id}/status");
        let response = self
            .client
            .transport()
            .issue(Method::Get, &path, &[], None)
            .await?;
        if !response.is_success() {
            return Err(task_error(&response, task_id));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Polls a task until it completes.
    ///
    /// Unlike the contents wait, a task that ends failed or cancelled is an
    /// error here: there is no partial output worth returning.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Timeout`] or [`PollError::Cancelled`] for local
    /// wait interruptions, or [`PollError::Client`] wrapping
    /// [`LexioError::TaskFailed`] / [`LexioError::TaskCancelled`] for
    /// server-side terminal failures.
    pub async fn wait(
        &self,
        task_id: &str,
        poll: Option<PollConfig>,
        on_progress: Option<ProgressFn<'_, ResearchStatusResponse>>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ResearchStatusResponse, PollError<ResearchStatusResponse>> {
        let config = poll.unwrap_or(self.client.config().poll);
        let fetch = || async {
            let status = self.status(task_id).await?;
            if !status.success {
                return Err(LexioError::api(
                    200,
                    status
                        .error
                        .unwrap_or_else(|| "status fetch reported failure".to_string()),
                ));
            }
            Ok(status)
        };
        let terminal = poll_until_terminal(fetch, &config, on_progress, cancel).await?;
        match terminal.status {
            Some(ResearchStatus::Failed) => Err(PollError::Client(LexioError::task_failed(
                task_id,
                terminal.error,
            ))),
            Some(ResearchStatus::Cancelled) => {
                Err(PollError::Client(LexioError::task_cancelled(task_id)))
            }
            _ => Ok(terminal),
        }
    }

    /// Streams incremental task updates to an observer until the task ends.
    ///
    /// Progress and activity messages are delivered as they appear; each
    /// message is delivered exactly once even though the underlying status
    /// responses are cumulative. Ends with `on_complete` for a successful
    /// task, or an error for a failed or cancelled one.
    ///
    /// # Errors
    ///
    /// Same as [`ResearchClient::wait`].
    pub async fn stream(
        &self,
        task_id: &str,
        observer: &dyn TaskObserver,
        poll: Option<PollConfig>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ResearchStatusResponse, PollError<ResearchStatusResponse>> {
        let delivered = Mutex::new(0_usize);
        let relay = |status: &ResearchStatusResponse| {
            if let Some(progress) = &status.progress {
                observer.on_progress(progress.current_step, progress.total_steps);
            }
            if let Some(messages) = &status.messages {
                let mut count = delivered.lock();
                for message in messages.iter().skip(*count) {
                    observer.on_message(message);
                }
                *count = messages.len().max(*count);
            }
        };

        let terminal = self.wait(task_id, poll, Some(&relay), cancel).await?;
        let caught = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            observer.on_complete(&terminal);
        }));
        if caught.is_err() {
            tracing::warn!("completion observer panicked");
        }
        Ok(terminal)
    }

    /// Adds a follow-up instruction to a running task.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty instruction,
    /// [`LexioError::TaskNotFound`] for an unknown id, or
    /// [`LexioError::InvalidState`] when the task is already terminal.
    pub async fn update(
        &self,
        task_id: &str,
        instruction: &str,
    ) -> Result<ResearchActionResponse> {
        if instruction.trim().is_empty() {
            return Err(ValidationError::new("instruction is required and cannot be empty")
                .with_field("instruction")
                .into());
        }
        let path = format!("/research/tasks/{task_id}/update");
        let payload = json!({ "instruction": instruction });
        let response = self
            .client
            .transport()
            .issue(Method::Post, &path, &[], Some(&payload))
            .await?;
        if !response.is_success() {
            return Err(task_error(&response, task_id));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Cancels a running task. Idempotent server-side; cancelling an already
    /// terminal task is an invalid-state error.
    ///
    /// # Errors
    ///
    /// Returns [`LexioError::TaskNotFound`], [`LexioError::InvalidState`], an
    /// API error, or a transport error.
    pub async fn cancel(&self, task_id: &str) -> Result<ResearchActionResponse> {
        let path = format!("/research/tasks/{task_id}/cancel");
        let response = self
            .client
            .transport()
            .issue(Method::Post, &path, &[], Some(&json!({})))
            .await?;
        if !response.is_success() {
            return Err(task_error(&response, task_id));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Deletes a task and its stored output.
    ///
    /// # Errors
    ///
    /// Returns [`LexioError::TaskNotFound`], [`LexioError::InvalidState`]
    /// (running tasks must be cancelled first), an API error, or a transport
    /// error.
    pub async fn delete(&self, task_id: &str) -> Result<ResearchActionResponse> {
        let path = format!("/research/tasks/{task_id}");
        let response = self
            .client
            .transport()
            .issue(Method::Delete, &path, &[], None)
            .await?;
        if !response.is_success() {
            return Err(task_error(&response, task_id));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Lists tasks for the authenticated key, newest first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a limit outside 1..=100, an API error,
    /// or a transport error.
    pub async fn list(&self, limit: Option<u32>) -> Result<ResearchListResponse> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            if !LIST_LIMIT_RANGE.contains(&limit) {
                return Err(ValidationError::new(format!(
                    "limit must be between {} and {} (got {limit})",
                    LIST_LIMIT_RANGE.start(),
                    LIST_LIMIT_RANGE.end()
                ))
                .with_field("limit")
                .into());
            }
            query.push(("limit".to_string(), limit.to_string()));
        }
        let response = self
            .client
            .transport()
            .issue(Method::Get, "/research/list", &query, None)
            .await?;
        if !response.is_success() {
            return Err(LexioError::api(response.status, response.error_message()));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Makes a task's report page public or private.
    ///
    /// # Errors
    ///
    /// Returns [`LexioError::TaskNotFound`], an API error, or a transport
    /// error.
    pub async fn toggle_public(
        &self,
        task_id: &str,
        is_public: bool,
    ) -> Result<TogglePublicResponse> {
        let path = format!("/research/tasks/{task_id}/public");
        let payload = json!({ "public": is_public });
        let response = self
            .client
            .transport()
            .issue(Method::Post, &path, &[], Some(&payload))
            .await?;
        if !response.is_success() {
            return Err(task_error(&response, task_id));
        }
        Ok(serde_json::from_value(response.body)?)
    }
}

/// Maps a non-success task response to the most specific error: 404 means
/// the id is unknown, 409 means the task's current state forbids the
/// operation.
fn task_error(response: &RawResponse, task_id: &str) -> LexioError {
    match response.status {
        404 => LexioError::task_not_found(task_id),
        409 => LexioError::invalid_state(task_id, response.error_message()),
        status => LexioError::api(status, response.error_message()),
    }
}
