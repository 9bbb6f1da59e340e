//! The top-level API client.

use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{LexioError, Result};
use crate::research::ResearchClient;
use crate::transport::{HttpTransport, Transport};

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV_VAR: &str = "LEXIO_API_KEY";

/// Client for the Lexio API.
///
/// Cheap to clone; clones share the underlying HTTP connection pool.
/// Operations live on the client directly ([`Lexio::search`],
/// [`Lexio::contents`], [`Lexio::datasources`]) or on the research
/// sub-client ([`Lexio::research`]).
///
/// ```no_run
/// # async fn run() -> lexio::Result<()> {
/// use lexio::{Lexio, search::SearchRequest};
///
/// let client = Lexio::from_env()?;
/// let response = client
///     .search(&SearchRequest::new("recent advances in perovskite solar cells"))
///     .await?;
/// for result in &response.results {
///     println!("{} — {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Lexio {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl Lexio {
    /// Creates a client with the given API key and default configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key contains characters not valid
    /// in an HTTP header, or a transport error if the HTTP client cannot be
    /// built.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Creates a client reading the API key from [`API_KEY_ENV_VAR`].
    ///
    /// # Errors
    ///
    /// Returns [`LexioError::MissingApiKey`] when the variable is unset or
    /// empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(LexioError::MissingApiKey {
                env_var: API_KEY_ENV_VAR,
            })?;
        Self::new(&api_key)
    }

    /// Creates a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Lexio::new`], plus a validation error for a non-positive
    /// timeout or an invalid polling configuration.
    pub fn with_config(api_key: &str, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(api_key, &config)?;
        debug!(base_url = %config.base_url, "client initialized");
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Creates a client over a custom [`Transport`]. This is the seam tests
    /// use to script responses; see [`crate::testing::MockTransport`].
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the research sub-client.
    #[must_use]
    pub fn research(&self) -> ResearchClient<'_> {
        ResearchClient::new(self)
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

impl std::fmt::Debug for Lexio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexio")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
