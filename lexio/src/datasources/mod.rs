//! Datasource discovery.
//!
//! The datasources endpoints are a manifest for agents: list what
//! proprietary datasets exist (with example queries for few-shot prompting)
//! before scoping a search with `included_sources`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::Lexio;
use crate::errors::{LexioError, Result};
use crate::transport::Method;

/// Per-million-token pricing for a datasource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasourcePricing {
    /// Cost per million tokens, in dollars.
    pub cpm: f64,
}

/// Date coverage of a datasource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceCoverage {
    /// Earliest covered date, ISO `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Latest covered date, ISO `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// A searchable proprietary dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datasource {
    /// Identifier, usable in search source filters (`provider/dataset`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the dataset contains.
    pub description: String,
    /// Category the dataset belongs to.
    pub category: String,
    /// Topics covered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    /// Languages of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    /// Example queries, useful for few-shot prompting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_queries: Option<Vec<String>>,
    /// Pricing, when the dataset is paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<DatasourcePricing>,
    /// Shape of structured results, when the dataset returns them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    /// How often the dataset is refreshed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,
    /// Date coverage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<DatasourceCoverage>,
}

/// Response from listing datasources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourcesResponse {
    /// Whether the fetch succeeded.
    pub success: bool,
    /// Request-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The available datasources.
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

/// A category of datasources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceCategory {
    /// Category identifier, usable as a `datasources` filter.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the category covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of datasets in the category.
    pub dataset_count: u32,
}

/// Response from listing datasource categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceCategoriesResponse {
    /// Whether the fetch succeeded.
    pub success: bool,
    /// Request-level error, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The available categories.
    #[serde(default)]
    pub categories: Vec<DatasourceCategory>,
}

impl Lexio {
    /// Lists available datasources, optionally filtered by category id.
    ///
    /// # Errors
    ///
    /// Returns an API error for non-2xx responses or a transport error.
    pub async fn datasources(&self, category: Option<&str>) -> Result<DatasourcesResponse> {
        let mut query = Vec::new();
        if let Some(category) = category {
            query.push(("category".to_string(), category.to_string()));
        }
        let response = self
            .transport()
            .issue(Method::Get, "/datasources", &query, None)
            .await?;
        if !response.is_success() {
            return Err(LexioError::api(response.status, response.error_message()));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// Lists datasource categories with dataset counts.
    ///
    /// # Errors
    ///
    /// Returns an API error for non-2xx responses or a transport error.
    pub async fn datasources_categories(&self) -> Result<DatasourceCategoriesResponse> {
        let response = self
            .transport()
            .issue(Method::Get, "/datasources/categories", &[], None)
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
    use crate::testing::MockTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn client_with(transport: Arc<MockTransport>) -> Lexio {
        Lexio::with_transport(transport, ClientConfig::default())
    }

    #[tokio::test]
    async fn test_datasources_passes_category_filter() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({
                "success": true,
                "datasources": [{
                    "id": "provider/finance-data",
                    "name": "Finance Data",
                    "description": "Company fundamentals",
                    "category": "markets",
                    "pricing": {"cpm": 2.5},
                    "example_queries": ["AAPL revenue 2025"]
                }]
            }),
        );
        let client = client_with(transport.clone());

        let listed = client.datasources(Some("markets")).await.unwrap();

        assert_eq!(listed.datasources.len(), 1);
        assert_eq!(listed.datasources[0].id, "provider/finance-data");
        let call = &transport.calls()[0];
        assert_eq!(call.path, "/datasources");
        assert_eq!(
            call.query,
            vec![("category".to_string(), "markets".to_string())]
        );
    }

    #[tokio::test]
    async fn test_categories_parse() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({
                "success": true,
                "categories": [
                    {"id": "markets", "name": "Markets", "dataset_count": 12},
                    {"id": "legal", "name": "Legal", "dataset_count": 4}
                ]
            }),
        );
        let client = client_with(transport.clone());

        let listed = client.datasources_categories().await.unwrap();

        assert_eq!(listed.categories.len(), 2);
        assert_eq!(listed.categories[0].dataset_count, 12);
        assert_eq!(transport.calls()[0].path, "/datasources/categories");
    }

    #[tokio::test]
    async fn test_non_success_maps_to_api_error() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(500, json!({"error": "upstream unavailable"}));
        let client = client_with(transport);

        let err = client.datasources(None).await.unwrap_err();

        assert!(matches!(err, LexioError::Api { status: 500, .. }));
    }
}
