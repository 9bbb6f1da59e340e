//! Search over web and proprietary sources.
//!
//! Search is the one fully synchronous operation: a single POST returns
//! ranked results. All request validation happens before the network call;
//! an empty result set is not an error.

pub mod types;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::client::Lexio;
use crate::contents::ResponseLength;
use crate::errors::{LexioError, Result, ValidationError};
use crate::transport::Method;

pub use types::{ResultsBySource, SearchResponse, SearchResult, SearchType};

/// Most results a single search may return.
pub const MAX_RESULTS: u32 = 100;

/// Checks one source filter entry. Accepted shapes: a bare domain
/// (`example.com`), a URL with scheme (`https://arxiv.org/abs/1706.03762`),
/// or a `provider/dataset` name.
fn is_valid_source(source: &str) -> bool {
    if source.is_empty() || source.contains(char::is_whitespace) {
        return false;
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        return source.len() > "https://".len();
    }
    if let Some((provider, dataset)) = source.split_once('/') {
        return !provider.is_empty()
            && !dataset.is_empty()
            && !provider.contains('.')
            && !dataset.contains('/');
    }
    // Bare domain: at least one dot with non-empty labels.
    source.contains('.') && source.split('.').all(|label| !label.is_empty())
}

fn validate_source_list(sources: &[String], field: &str) -> Result<(), ValidationError> {
    let invalid: Vec<&str> = sources
        .iter()
        .filter(|s| !is_valid_source(s))
        .map(String::as_str)
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }
    Err(ValidationError::new(format!(
        "invalid sources ({}): expected a domain, a URL, or a provider/dataset name",
        invalid.join(", ")
    ))
    .with_field(field))
}

fn is_valid_country_code(code: &str) -> bool {
    code.eq_ignore_ascii_case("ALL")
        || (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_valid_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// A search request, built up fluently.
///
/// ```no_run
/// use lexio::search::{SearchRequest, SearchType};
///
/// let request = SearchRequest::new("solid-state battery manufacturers")
///     .with_search_type(SearchType::Web)
///     .with_max_num_results(20)
///     .with_included_sources(["arxiv.org", "provider/finance-data"]);
/// ```
#[derive(Debug, Clone)]
pub struct SearchRequest {
    query: String,
    search_type: SearchType,
    max_num_results: u32,
    relevance_threshold: Option<f64>,
    max_price: Option<f64>,
    included_sources: Option<Vec<String>>,
    excluded_sources: Option<Vec<String>>,
    country_code: Option<String>,
    response_length: Option<ResponseLength>,
    category: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    fast_mode: bool,
    url_only: bool,
}

impl SearchRequest {
    /// Creates a request for the given query with default options.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_type: SearchType::All,
            max_num_results: 10,
            relevance_threshold: None,
            max_price: None,
            included_sources: None,
            excluded_sources: None,
            country_code: None,
            response_length: None,
            category: None,
            start_date: None,
            end_date: None,
            fast_mode: false,
            url_only: false,
        }
    }

    /// Sets which backends to query.
    #[must_use]
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    /// Sets the maximum number of results (1 to [`MAX_RESULTS`]).
    #[must_use]
    pub fn with_max_num_results(mut self, max: u32) -> Self {
        self.max_num_results = max;
        self
    }

    /// Drops results scoring below this threshold (0.0 to 1.0).
    #[must_use]
    pub fn with_relevance_threshold(mut self, threshold: f64) -> Self {
        self.relevance_threshold = Some(threshold);
        self
    }

    /// Caps spend, in dollars per thousand queries.
    #[must_use]
    pub fn with_max_price(mut self, dollars: f64) -> Self {
        self.max_price = Some(dollars);
        self
    }

    /// Restricts the search to these sources.
    #[must_use]
    pub fn with_included_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Excludes these sources from the search.
    #[must_use]
    pub fn with_excluded_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Filters results by country: a two-letter ISO code, or `ALL`.
    #[must_use]
    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    /// Caps the content length per result.
    #[must_use]
    pub fn with_response_length(mut self, length: ResponseLength) -> Self {
        self.response_length = Some(length);
        self
    }

    /// Filters results by a source-dependent category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Keeps only content published on or after this date (`YYYY-MM-DD`).
    #[must_use]
    pub fn with_start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Keeps only content published on or before this date (`YYYY-MM-DD`).
    #[must_use]
    pub fn with_end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Trades result depth for latency.
    #[must_use]
    pub fn with_fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    /// Returns shortened snippets only.
    #[must_use]
    pub fn with_url_only(mut self, url_only: bool) -> Self {
        self.url_only = url_only;
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.query.trim().is_empty() {
            return Err(
                ValidationError::new("query is required and cannot be empty").with_field("query"),
            );
        }
        if self.max_num_results == 0 || self.max_num_results > MAX_RESULTS {
            return Err(ValidationError::new(format!(
                "max_num_results must be between 1 and {MAX_RESULTS} (got {})",
                self.max_num_results
            ))
            .with_field("max_num_results"));
        }
        if let Some(threshold) = self.relevance_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ValidationError::new(format!(
                    "relevance_threshold must be between 0.0 and 1.0 (got {threshold})"
                ))
                .with_field("relevance_threshold"));
            }
        }
        if let Some(sources) = &self.included_sources {
            validate_source_list(sources, "included_sources")?;
        }
        if let Some(sources) = &self.excluded_sources {
            validate_source_list(sources, "excluded_sources")?;
        }
        if let Some(code) = &self.country_code {
            if !is_valid_country_code(code) {
                return Err(ValidationError::new(format!(
                    "country_code must be a two-letter ISO code or ALL (got {code})"
                ))
                .with_field("country_code"));
            }
        }
        for (field, date) in [("start_date", &self.start_date), ("end_date", &self.end_date)] {
            if let Some(date) = date {
                if !is_valid_date(date) {
                    return Err(ValidationError::new(format!(
                        "{field} must be an ISO date (YYYY-MM-DD), got {date}"
                    ))
                    .with_field(field));
                }
            }
        }
        Ok(())
    }

    fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("query".to_string(), Value::String(self.query.clone()));
        map.insert("search_type".to_string(), json!(self.search_type));
        map.insert("max_num_results".to_string(), json!(self.max_num_results));
        map.insert("fast_mode".to_string(), Value::Bool(self.fast_mode));
        map.insert("url_only".to_string(), Value::Bool(self.url_only));
        if let Some(threshold) = self.relevance_threshold {
            map.insert("relevance_threshold".to_string(), json!(threshold));
        }
        if let Some(price) = self.max_price {
            map.insert("max_price".to_string(), json!(price));
        }
        if let Some(sources) = &self.included_sources {
            map.insert("included_sources".to_string(), json!(sources));
        }
        if let Some(sources) = &self.excluded_sources {
            map.insert("excluded_sources".to_string(), json!(sources));
        }
        if let Some(code) = &self.country_code {
            map.insert(
                "country_code".to_string(),
                Value::String(code.to_ascii_uppercase()),
            );
        }
        if let Some(length) = self.response_length {
            map.insert("response_length".to_string(), json!(length));
        }
        if let Some(category) = &self.category {
            map.insert("category".to_string(), Value::String(category.clone()));
        }
        if let Some(date) = &self.start_date {
            map.insert("start_date".to_string(), Value::String(date.clone()));
        }
        if let Some(date) = &self.end_date {
            map.insert("end_date".to_string(), Value::String(date.clone()));
        }
        Value::Object(map)
    }
}

impl Lexio {
    /// Runs a search and returns ranked results.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed request (caught before any
    /// network traffic), a transport error, or an API error for non-2xx
    /// responses. An empty result set is returned as `Ok`.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        request.validate()?;
        let payload = request.payload();
        let response = self
            .transport()
            .issue(Method::Post, "/search", &[], Some(&payload))
            .await?;
        if !response.is_success() {
            return Err(LexioError::api(response.status, response.error_message()));
        }
        Ok(serde_json::from_value(response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::contents::LengthPreset;
    use crate::testing::MockTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn client_with(transport: Arc<MockTransport>) -> Lexio {
        Lexio::with_transport(transport, ClientConfig::default())
    }

    #[test]
    fn test_source_format_acceptance() {
        assert!(is_valid_source("example.com"));
        assert!(is_valid_source("news.ycombinator.com"));
        assert!(is_valid_source("https://arxiv.org/abs/1706.03762"));
        assert!(is_valid_source("provider/finance-data"));

        assert!(!is_valid_source(""));
        assert!(!is_valid_source("not a source"));
        assert!(!is_valid_source("nodots"));
        assert!(!is_valid_source("/dataset"));
        assert!(!is_valid_source("provider/"));
        assert!(!is_valid_source("trailing.dot."));
    }

    #[test]
    fn test_country_code_acceptance() {
        assert!(is_valid_country_code("US"));
        assert!(is_valid_country_code("gb"));
        assert!(is_valid_country_code("all"));
        assert!(!is_valid_country_code("USA"));
        assert!(!is_valid_country_code("1A"));
    }

    #[tokio::test]
    async fn test_invalid_sources_rejected_before_any_request() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(transport.clone());
        let request = SearchRequest::new("q").with_included_sources(["not a source"]);

        let err = client.search(&request).await.unwrap_err();

        assert!(matches!(err, LexioError::Validation(_)));
        assert!(err.to_string().contains("not a source"));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_options_rejected() {
        let transport = Arc::new(MockTransport::new());
        let client = client_with(transport.clone());

        let too_many = SearchRequest::new("q").with_max_num_results(101);
        assert!(client.search(&too_many).await.is_err());

        let bad_threshold = SearchRequest::new("q").with_relevance_threshold(1.5);
        assert!(client.search(&bad_threshold).await.is_err());

        let bad_date = SearchRequest::new("q").with_start_date("01-01-2024");
        assert!(client.search(&bad_date).await.is_err());

        let bad_country = SearchRequest::new("q").with_country_code("USA");
        assert!(client.search(&bad_country).await.is_err());

        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_posts_payload_and_parses_results() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({
                "success": true,
                "tx_id": "tx-1",
                "query": "solid-state batteries",
                "results": [{
                    "title": "A battery paper",
                    "url": "https://arxiv.org/abs/2401.00001",
                    "content": "Solid-state batteries...",
                    "source": "arxiv.org",
                    "length": 24,
                    "relevance_score": 0.93
                }],
                "results_by_source": {"web": 1, "proprietary": 0},
                "total_deduction_dollars": 0.015,
                "total_characters": 24
            }),
        );
        let client = client_with(transport.clone());
        let request = SearchRequest::new("solid-state batteries")
            .with_search_type(SearchType::Web)
            .with_max_num_results(5)
            .with_country_code("us")
            .with_response_length(ResponseLength::Preset(LengthPreset::Short));

        let response = client.search(&request).await.unwrap();

        assert!(response.success);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results_by_source.web, 1);

        let call = &transport.calls()[0];
        assert_eq!(call.path, "/search");
        let body = call.body.as_ref().unwrap();
        assert_eq!(body["search_type"], json!("web"));
        assert_eq!(body["max_num_results"], json!(5));
        assert_eq!(body["country_code"], json!("US"));
        assert_eq!(body["response_length"], json!("short"));
        assert_eq!(body["fast_mode"], json!(false));
    }

    #[tokio::test]
    async fn test_api_error_surfaces_with_status_and_message() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(429, json!({"error": "rate limit exceeded"}));
        let client = client_with(transport);

        let err = client.search(&SearchRequest::new("q")).await.unwrap_err();

        match err {
            LexioError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limit exceeded");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_results_with_explanation_is_ok() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({
                "success": true,
                "error": "no sources matched the requested filters",
                "tx_id": "tx-2",
                "query": "q",
                "results": []
            }),
        );
        let client = client_with(transport);

        let response = client.search(&SearchRequest::new("q")).await.unwrap();

        assert!(response.success);
        assert!(response.results.is_empty());
    }
}
