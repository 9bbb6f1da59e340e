//! HTTP transport seam.
//!
//! The client core never talks to `reqwest` directly; every exchange goes
//! through the [`Transport`] trait so tests can script responses and callers
//! can substitute their own HTTP stack. Authentication header injection and
//! per-request timeouts live behind this seam; retry policy, if any, belongs
//! here too and never in the polling loop.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

/// HTTP method for an API exchange.
///
/// The API surface only uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP DELETE.
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A raw API response: status code plus parsed JSON body.
///
/// The status code is kept because the contents endpoint distinguishes
/// synchronous completion (200) from async job acceptance (202).
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body. Non-JSON bodies parse to an empty object.
    pub body: Value,
}

impl RawResponse {
    /// Whether the response has a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the response is a 202 Accepted (async job created).
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.status == 202
    }

    /// Extracts the server error message, falling back to a generic one.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(|| format!("HTTP Error: {}", self.status), str::to_string)
    }
}

/// A single request/response exchange with the API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a request against an API path (relative to the base URL) and
    /// returns the raw response. Transport-level failures (connect, TLS,
    /// per-request timeout) surface as errors; non-2xx statuses do not.
    async fn issue(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_raw_response_success() {
        let resp = RawResponse {
            status: 200,
            body: json!({}),
        };
        assert!(resp.is_success());
        assert!(!resp.is_accepted());

        let accepted = RawResponse {
            status: 202,
            body: json!({}),
        };
        assert!(accepted.is_success());
        assert!(accepted.is_accepted());

        let not_found = RawResponse {
            status: 404,
            body: json!({}),
        };
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_error_message_extraction() {
        let resp = RawResponse {
            status: 400,
            body: json!({"error": "urls is required"}),
        };
        assert_eq!(resp.error_message(), "urls is required");

        let bare = RawResponse {
            status: 500,
            body: json!({}),
        };
        assert_eq!(bare.error_message(), "HTTP Error: 500");
    }
}
