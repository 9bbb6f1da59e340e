//! Wire types for the Search API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which backends a search queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Web and proprietary sources.
    #[default]
    All,
    /// Web sources only.
    Web,
    /// Proprietary datasets only.
    Proprietary,
    /// News sources only.
    News,
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub url: String,
    /// Result content. Usually text; structured sources return objects or
    /// arrays.
    pub content: Value,
    /// Short description, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source identifier (domain or dataset).
    #[serde(default)]
    pub source: String,
    /// Cost attributed to this result, in dollars per thousand queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Content length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// Relevance score in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    /// Whether the content is structured or unstructured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Kind of source the result came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Publication date, when detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
}

/// Result counts per backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsBySource {
    /// Hits from web sources.
    #[serde(default)]
    pub web: u32,
    /// Hits from proprietary datasets.
    #[serde(default)]
    pub proprietary: u32,
}

/// Response from a search.
///
/// A search that finds nothing is not an error: `success` stays true and
/// `error` may carry an explanation (for example, no sources matched the
/// filters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Whether the search succeeded.
    pub success: bool,
    /// Explanation when the search failed or found nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Transaction identifier for billing and support.
    #[serde(default)]
    pub tx_id: String,
    /// The query as the server interpreted it.
    #[serde(default)]
    pub query: String,
    /// The hits, most relevant first.
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// Hit counts per backend.
    #[serde(default)]
    pub results_by_source: ResultsBySource,
    /// Amount deducted for this search, in dollars.
    #[serde(default)]
    pub total_deduction_dollars: f64,
    /// Total characters across all results.
    #[serde(default)]
    pub total_characters: u64,
}
