//! # Lexio
//!
//! A Rust client for the Lexio search and research API.
//!
//! The API has three surfaces, and this crate mirrors them:
//!
//! - **Search**: synchronous ranked search over web and proprietary sources
//! - **Contents**: page extraction, inline for small batches or as async
//!   jobs with polling and completion webhooks
//! - **Research**: long-running agentic research tasks with progress
//!   streaming, follow-up instructions, and lifecycle management
//!
//! Async jobs and research tasks share one polling loop
//! ([`poller::poll_until_terminal`]) with a fixed interval, an overall
//! deadline, progress observers, and cooperative cancellation. Completion
//! webhooks are verified with [`webhooks::verify_webhook`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lexio::{Lexio, search::SearchRequest};
//!
//! let client = Lexio::from_env()?;
//! let response = client
//!     .search(&SearchRequest::new("lithium supply forecasts").with_max_num_results(5))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod client;
pub mod config;
pub mod contents;
pub mod datasources;
pub mod errors;
pub mod poller;
pub mod research;
pub mod search;
pub mod testing;
pub mod transport;
pub mod webhooks;

pub use cancellation::CancellationToken;
pub use client::Lexio;
pub use config::{ClientConfig, PollConfig};
pub use errors::{LexioError, Result, ValidationError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::client::Lexio;
    pub use crate::config::{ClientConfig, PollConfig};
    pub use crate::contents::{
        ContentsJobStatus, ContentsOutcome, ContentsRequest, ContentsResponse, ContentsResult,
        JobStatus,
    };
    pub use crate::datasources::{DatasourceCategoriesResponse, DatasourcesResponse};
    pub use crate::errors::{LexioError, Result, ValidationError};
    pub use crate::poller::{PollError, TaskSnapshot};
    pub use crate::research::{
        ResearchClient, ResearchMode, ResearchRequest, ResearchStatus, ResearchStatusResponse,
        TaskObserver,
    };
    pub use crate::search::{SearchRequest, SearchResponse, SearchResult, SearchType};
    pub use crate::webhooks::{verify_webhook, SIGNATURE_HEADER, TIMESTAMP_HEADER};
}
