//! Wire types for the Research API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::poller::TaskSnapshot;
use crate::search::SearchType;

/// Lifecycle state of a research task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    /// Accepted, waiting for a worker.
    Queued,
    /// Research in progress.
    Running,
    /// Finished with output.
    Completed,
    /// Finished without usable output.
    Failed,
    /// Stopped before completion.
    Cancelled,
}

impl ResearchStatus {
    /// Whether no further state transition is expected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// How much effort the research task spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchMode {
    /// Quick, shallow pass.
    Fast,
    /// Balanced depth and latency.
    Standard,
    /// Exhaustive multi-step research.
    Heavy,
}

/// Named output format preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatPreset {
    /// Markdown report.
    Markdown,
    /// Rendered PDF alongside the report.
    Pdf,
}

/// Requested output format: a named preset or a JSON schema for structured
/// output. A schema cannot be mixed with named presets in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputFormat {
    /// Named preset.
    Preset(FormatPreset),
    /// JSON schema; the task output becomes structured JSON.
    Schema(Value),
}

/// Scoping for the searches a research task performs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchSearchConfig {
    /// Which backends to query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    /// Source types to restrict to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included_sources: Option<Vec<String>>,
    /// Source types to exclude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_sources: Option<Vec<String>>,
    /// Earliest publication date, ISO `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Latest publication date, ISO `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Source-dependent category filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Step progress reported while a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Current step, 1-based.
    pub current_step: u32,
    /// Total planned steps.
    pub total_steps: u32,
}

/// A source consulted during research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSource {
    /// Source title.
    pub title: String,
    /// Source URL.
    pub url: String,
    /// Short excerpt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Source identifier (usually the domain or dataset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Source category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Word count of the consulted document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

/// Shape of a completed task's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    /// Markdown report text.
    Markdown,
    /// Structured JSON per the submitted schema.
    Json,
}

/// Response from creating a research task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchCreateResponse {
    /// Whether the task was accepted.
    pub success: bool,
    /// Identifier for subsequent operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<String>,
    /// Initial status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResearchStatus>,
    /// Effort mode the task was accepted with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ResearchMode>,
    /// Creation time, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Whether the task's report page is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// HMAC secret for verifying the completion webhook. Only present when
    /// the request carried a `webhook_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    /// Informational message from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Request-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full status of a research task, including output once terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchStatusResponse {
    /// Whether the status fetch succeeded.
    pub success: bool,
    /// Task identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<String>,
    /// Current lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResearchStatus>,
    /// The research query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Effort mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ResearchMode>,
    /// Requested output formats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_formats: Option<Vec<OutputFormat>>,
    /// Creation time, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Whether the task's report page is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Step progress, while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    /// Streamed activity messages, cumulative across fetches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Value>>,
    /// Completion time, RFC 3339, once terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// The report: markdown text or structured JSON per `output_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Shape of `output`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    /// Download URL for the rendered PDF, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    /// Sources consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<ResearchSource>>,
    /// Total cost in dollars, once terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Task-level error, for failed tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot for ResearchStatusResponse {
    fn is_terminal(&self) -> bool {
        self.status.is_some_and(ResearchStatus::is_terminal)
    }
}

/// Minimal task info in list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchTaskSummary {
    /// Task identifier.
    pub research_id: String,
    /// The research query.
    pub query: String,
    /// Current lifecycle state.
    pub status: ResearchStatus,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Whether the task's report page is public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// Response from listing research tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchListResponse {
    /// Whether the fetch succeeded.
    pub success: bool,
    /// The tasks, newest first.
    #[serde(default)]
    pub tasks: Vec<ResearchTaskSummary>,
    /// Request-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response from update, cancel, and delete operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchActionResponse {
    /// Whether the operation was applied.
    pub success: bool,
    /// Informational message from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The affected task id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<String>,
    /// Operation-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response from toggling a task's public flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TogglePublicResponse {
    /// Whether the flag was changed.
    pub success: bool,
    /// Informational message from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The affected task id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_id: Option<String>,
    /// The new public state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Operation-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
