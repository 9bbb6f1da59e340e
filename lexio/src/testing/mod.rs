//! Testing utilities for code built on the Lexio client.
//!
//! [`MockTransport`] scripts API responses and records every request, so
//! client behavior can be tested without a network.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::errors::{LexioError, Result};
use crate::transport::{Method, RawResponse, Transport};

/// A recorded request issued through a [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// HTTP method.
    pub method: Method,
    /// Request path, relative to the base URL.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body, for POST requests that carried one.
    pub body: Option<Value>,
}

/// A transport that returns scripted responses in FIFO order and records
/// every call.
///
/// Running out of scripted responses is a test bug and surfaces as an API
/// error with status 599.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Creates a mock with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON response with the given status.
    pub fn push_json(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .push_back(Ok(RawResponse { status, body }));
    }

    /// Queues an error, as if the transport itself failed.
    pub fn push_error(&self, error: LexioError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Returns how many requests were issued.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns every recorded request, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Clears recorded calls and any remaining scripted responses.
    pub fn reset(&self) {
        self.calls.lock().clear();
        self.responses.lock().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn issue(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<RawResponse> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
        });
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Ok(RawResponse {
                status: 599,
                body: Value::String("no scripted response left".to_string()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_responses_return_in_order() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({"first": true}));
        transport.push_json(202, json!({"second": true}));

        let first = transport.issue(Method::Get, "/a", &[], None).await.unwrap();
        let second = transport.issue(Method::Post, "/b", &[], None).await.unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 202);
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.calls()[1].path, "/b");
    }

    #[tokio::test]
    async fn test_exhausted_script_yields_sentinel_status() {
        let transport = MockTransport::new();

        let response = transport.issue(Method::Get, "/a", &[], None).await.unwrap();

        assert_eq!(response.status, 599);
    }

    #[tokio::test]
    async fn test_pushed_errors_propagate() {
        let transport = MockTransport::new();
        transport.push_error(LexioError::api(503, "down"));

        let err = transport
            .issue(Method::Get, "/a", &[], None)
            .await
            .unwrap_err();

        assert!(matches!(err, LexioError::Api { status: 503, .. }));
    }
}
