//! Default `reqwest`-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use super::{Method, RawResponse, Transport};
use crate::config::ClientConfig;
use crate::errors::{Result, ValidationError};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Transport backed by a shared `reqwest::Client`.
///
/// Injects the API key and JSON headers on every request and applies the
/// per-request timeout from [`ClientConfig`]. A per-request timeout here is
/// distinct from the poller's overall deadline.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport with the given API key and configuration.
    pub fn new(api_key: &str, config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key_value = HeaderValue::from_str(api_key).map_err(|_| {
            ValidationError::new("api_key contains characters not valid in a header")
                .with_field("api_key")
        })?;
        headers.insert(API_KEY_HEADER, key_value);
        let agent = HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("lexio-rust"));
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn issue(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        let url = self.url_for(path);
        debug!(%method, %url, "issuing API request");

        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        // Error bodies are not always JSON; treat anything unparseable as empty.
        let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::Object(Default::default()));

        debug!(status, %url, "API response received");
        Ok(RawResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
