//! Wire types for the Contents API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::poller::TaskSnapshot;

/// Lifecycle state of an async contents job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, not yet started.
    Pending,
    /// URLs are being fetched and extracted.
    Processing,
    /// Every URL extracted successfully.
    Completed,
    /// Finished with a mix of successes and failures.
    Partial,
    /// Finished with no usable results.
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

impl JobStatus {
    /// Whether no further state transition is expected.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Partial | Self::Failed | Self::Cancelled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// How aggressively to extract page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractEffort {
    /// Fast single-pass extraction.
    Normal,
    /// Slower extraction that handles heavier pages.
    High,
    /// Let the server pick per URL.
    Auto,
}

/// Named response-length preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPreset {
    /// Roughly a paragraph.
    Short,
    /// Roughly a page.
    Medium,
    /// Several pages.
    Large,
    /// No truncation.
    Max,
}

/// Response length: a named preset or an explicit character cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseLength {
    /// Named preset.
    Preset(LengthPreset),
    /// Maximum number of characters per result.
    Characters(u64),
}

/// Per-URL extraction outcome, discriminated by the `status` field.
///
/// Older API responses omit `status`; [`normalize_results`] backfills it
/// before deserialization so both shapes parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContentsResult {
    /// The URL was fetched and its content extracted.
    Success(ContentsSuccess),
    /// Extraction failed for this URL; the job itself may still succeed.
    Failed(ContentsFailure),
}

impl ContentsResult {
    /// The URL this result is for.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Success(ok) => &ok.url,
            Self::Failed(err) => &err.url,
        }
    }

    /// Whether extraction succeeded for this URL.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// A successfully extracted page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsSuccess {
    /// Source URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Extracted content.
    pub content: String,
    /// Content length in characters.
    pub length: u64,
    /// Source identifier (usually the domain).
    pub source: String,
    /// AI summary, when requested: plain text or structured per the
    /// submitted schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    /// Screenshot URL, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,
    /// Publication date, when detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    /// Formatted citation, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    /// Kind of data extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

/// A URL that could not be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsFailure {
    /// Source URL.
    pub url: String,
    /// What went wrong.
    pub error: String,
}

/// Backfills the `status` discriminator on results the API sent without one.
/// A result with both `title` and `content` counts as a success; anything
/// else is a failure with a placeholder error.
fn normalize_result(raw: &mut Value) {
    let Value::Object(map) = raw else { return };
    if map.contains_key("status") {
        return;
    }
    if map.contains_key("title") && map.contains_key("content") {
        map.insert("status".to_string(), Value::from("success"));
    } else {
        map.insert("status".to_string(), Value::from("failed"));
        map.entry("error".to_string())
            .or_insert_with(|| Value::from("Unknown error"));
    }
}

fn deserialize_results<'de, D>(deserializer: D) -> Result<Vec<ContentsResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut items: Vec<Value> = Vec::deserialize(deserializer)?;
    items.iter_mut().for_each(normalize_result);
    items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect()
}

fn deserialize_optional_results<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<ContentsResult>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    let Some(mut items) = raw else { return Ok(None) };
    items.iter_mut().for_each(normalize_result);
    items
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(serde::de::Error::custom))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Synchronous extraction response (HTTP 200).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsResponse {
    /// Whether the request as a whole succeeded.
    pub success: bool,
    /// Request-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Transaction identifier for billing and support.
    #[serde(default)]
    pub tx_id: String,
    /// Number of URLs submitted.
    #[serde(default)]
    pub urls_requested: u32,
    /// Number of URLs processed.
    #[serde(default)]
    pub urls_processed: u32,
    /// Number of URLs that failed.
    #[serde(default)]
    pub urls_failed: u32,
    /// Per-URL outcomes.
    #[serde(default, deserialize_with = "deserialize_results")]
    pub results: Vec<ContentsResult>,
    /// Total cost of the request in dollars.
    #[serde(default)]
    pub total_cost_dollars: f64,
    /// Total characters extracted across all results.
    #[serde(default)]
    pub total_characters: u64,
}

/// Async job acceptance response (HTTP 202).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsJobCreateResponse {
    /// Whether the job was accepted.
    pub success: bool,
    /// Identifier for subsequent status fetches.
    pub job_id: String,
    /// Initial status, always pending on acceptance.
    pub status: JobStatus,
    /// Number of URLs queued.
    pub urls_total: u32,
    /// HMAC secret for verifying the completion webhook. Only present when
    /// the request carried a `webhook_url`; this is the only place the
    /// secret is ever disclosed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    /// Transaction identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

/// Point-in-time status of an async contents job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsJobStatus {
    /// Whether the status fetch succeeded.
    pub success: bool,
    /// Job identifier.
    pub job_id: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Number of URLs queued.
    #[serde(default)]
    pub urls_total: u32,
    /// URLs processed so far.
    #[serde(default)]
    pub urls_processed: u32,
    /// URLs that failed so far.
    #[serde(default)]
    pub urls_failed: u32,
    /// Creation time, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Last update time, Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// Per-URL outcomes, populated once the job is terminal.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_results",
        skip_serializing_if = "Option::is_none"
    )]
    pub results: Option<Vec<ContentsResult>>,
    /// Final cost in dollars, populated once the job is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost_dollars: Option<f64>,
    /// Job-level error, for failed jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot for ContentsJobStatus {
    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_job_status_terminality() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Partial.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_response_length_serializes_both_shapes() {
        assert_eq!(
            serde_json::to_value(ResponseLength::Preset(LengthPreset::Short)).unwrap(),
            json!("short")
        );
        assert_eq!(
            serde_json::to_value(ResponseLength::Characters(25_000)).unwrap(),
            json!(25_000)
        );
    }

    #[test]
    fn test_tagged_result_parses() {
        let ok: ContentsResult = serde_json::from_value(json!({
            "status": "success",
            "url": "https://example.com",
            "title": "Example",
            "content": "Hello",
            "length": 5,
            "source": "example.com"
        }))
        .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.url(), "https://example.com");

        let failed: ContentsResult = serde_json::from_value(json!({
            "status": "failed",
            "url": "https://example.com/missing",
            "error": "404 Not Found"
        }))
        .unwrap();
        assert!(!failed.is_success());
    }

    #[test]
    fn test_untagged_results_get_status_backfilled() {
        let response: ContentsResponse = serde_json::from_value(json!({
            "success": true,
            "tx_id": "tx-1",
            "urls_requested": 2,
            "urls_processed": 1,
            "urls_failed": 1,
            "results": [
                {
                    "url": "https://a.example",
                    "title": "A",
                    "content": "body",
                    "length": 4,
                    "source": "a.example"
                },
                { "url": "https://b.example" }
            ],
            "total_cost_dollars": 0.01,
            "total_characters": 4
        }))
        .unwrap();

        assert!(response.results[0].is_success());
        match &response.results[1] {
            ContentsResult::Failed(failure) => assert_eq!(failure.error, "Unknown error"),
            other => panic!("expected backfilled failure, got {other:?}"),
        }
    }

    #[test]
    fn test_job_status_snapshot_parses_and_reports_terminal() {
        let status: ContentsJobStatus = serde_json::from_value(json!({
            "success": true,
            "job_id": "job-1",
            "status": "partial",
            "urls_total": 3,
            "urls_processed": 2,
            "urls_failed": 1,
            "results": [
                {
                    "url": "https://a.example",
                    "status": "success",
                    "title": "A",
                    "content": "body",
                    "length": 4,
                    "source": "a.example"
                }
            ],
            "actual_cost_dollars": 0.02
        }))
        .unwrap();

        assert!(status.is_terminal());
        assert_eq!(status.results.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_in_flight_job_status_has_no_results() {
        let status: ContentsJobStatus = serde_json::from_value(json!({
            "success": true,
            "job_id": "job-1",
            "status": "processing",
            "urls_total": 3,
            "urls_processed": 1,
            "urls_failed": 0
        }))
        .unwrap();

        assert!(!status.is_terminal());
        assert!(status.results.is_none());
    }
}
