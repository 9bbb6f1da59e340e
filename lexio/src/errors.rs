//! Error types for the Lexio client.
//!
//! Every failure the client can surface is a distinct, catchable variant.
//! Validation errors are raised before any network call; transport and API
//! failures are kept separate from task-level failures so callers can tell
//! "the request broke" apart from "the work failed".

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type Result<T, E = LexioError> = std::result::Result<T, E>;

/// The main error type for Lexio client operations.
#[derive(Debug, Error)]
pub enum LexioError {
    /// Malformed or out-of-bound caller input, detected before any network call.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No API key was supplied and none was found in the environment.
    #[error("API key is not set (pass one explicitly or set {env_var})")]
    MissingApiKey {
        /// The environment variable that was consulted.
        env_var: &'static str,
    },

    /// A transport-level failure (connection, TLS, per-request timeout).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-success status with an error body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or a generic fallback.
        message: String,
    },

    /// A response body could not be parsed into the expected shape.
    #[error("failed to parse response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The referenced job or task does not exist.
    #[error("task not found: {task_id}")]
    TaskNotFound {
        /// The id that was not found.
        task_id: String,
    },

    /// An operation was attempted against a task already in a terminal state.
    #[error("invalid state for task {task_id}: {message}")]
    InvalidState {
        /// The target task id.
        task_id: String,
        /// Server-provided detail about the conflicting state.
        message: String,
    },

    /// The task itself failed server-side. Distinct from transport failures:
    /// the request succeeded, the work did not.
    #[error("task {task_id} failed: {}", error.as_deref().unwrap_or("unknown error"))]
    TaskFailed {
        /// The failed task id.
        task_id: String,
        /// Failure detail reported by the server, if any.
        error: Option<String>,
    },

    /// The task was cancelled server-side before reaching completion.
    #[error("task {task_id} was cancelled")]
    TaskCancelled {
        /// The cancelled task id.
        task_id: String,
    },

    /// A wait on a long-running job exceeded its configured deadline. The
    /// remote work keeps running; only the local wait gave up.
    #[error("wait timed out: {message}")]
    WaitTimeout {
        /// Detail including how long was waited.
        message: String,
    },

    /// A wait was cancelled locally via a cancellation token. The remote
    /// work keeps running unless cancelled server-side as well.
    #[error("wait cancelled: {message}")]
    WaitCancelled {
        /// The cancellation reason.
        message: String,
    },
}

impl LexioError {
    /// Creates an API error from a status code and message.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a task-not-found error.
    #[must_use]
    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound {
            task_id: task_id.into(),
        }
    }

    /// Creates an invalid-state error.
    #[must_use]
    pub fn invalid_state(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidState {
            task_id: task_id.into(),
            message: message.into(),
        }
    }

    /// Creates a task-failed error.
    #[must_use]
    pub fn task_failed(task_id: impl Into<String>, error: Option<String>) -> Self {
        Self::TaskFailed {
            task_id: task_id.into(),
            error,
        }
    }

    /// Creates a task-cancelled error.
    #[must_use]
    pub fn task_cancelled(task_id: impl Into<String>) -> Self {
        Self::TaskCancelled {
            task_id: task_id.into(),
        }
    }

    /// Returns true if this error was raised before any network call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingApiKey { .. })
    }
}

/// Error raised when caller input fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// The error message.
    pub message: String,
    /// The offending field, when a single one can be named.
    pub field: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Sets the offending field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}
