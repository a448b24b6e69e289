/// Search index client
///
/// `SearchIndex` is the seam to the external full-text/vector index.
/// `MeilisearchClient` speaks the Meilisearch HTTP API over reqwest:
///   POST /indexes/{uid}/search   single query
///   POST /multi-search           federated query
/// Failures are returned as-is; retries and caching belong to the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::federated::{FederatedRequest, HybridConfig};

/// Errors that can occur while talking to the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Transport failure (connect, timeout, TLS)
    #[error("Index request failed: {0}")]
    Request(String),

    /// Index returned a non-success status
    #[error("Index API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode index response: {0}")]
    Decode(String),

    /// Client could not be constructed from configuration
    #[error("Index client not configured: {0}")]
    NotConfigured(String),
}

/// Single-index query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid: Option<HybridConfig>,
    pub limit: usize,
    pub offset: usize,
    pub show_ranking_score: bool,
}

/// Ranked hits plus totals, shared by single and federated search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<serde_json::Value>,
    #[serde(default, rename = "estimatedTotalHits", alias = "totalHits")]
    pub total_hits: Option<u64>,
    #[serde(default)]
    pub processing_time_ms: u64,
}

/// External full-text/vector index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, index_uid: &str, request: &SearchRequest) -> Result<SearchResponse, IndexError>;

    async fn federated_search(&self, request: &FederatedRequest) -> Result<SearchResponse, IndexError>;
}

/// Meilisearch-backed index client.
pub struct MeilisearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl MeilisearchClient {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, IndexError> {
        if base_url.trim().is_empty() {
            return Err(IndexError::NotConfigured("index url is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::NotConfigured(format!("Failed to build HTTP client: {}", e)))?;

        Ok(MeilisearchClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<SearchResponse, IndexError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IndexError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(IndexError::Api { status, message });
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| IndexError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SearchIndex for MeilisearchClient {
    async fn search(&self, index_uid: &str, request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        let path = format!("/indexes/{}/search", index_uid);
        let response = self.post(&path, request).await?;
        tracing::debug!(
            index = index_uid,
            hits = response.hits.len(),
            processing_time_ms = response.processing_time_ms,
            "Index search complete"
        );
        Ok(response)
    }

    async fn federated_search(&self, request: &FederatedRequest) -> Result<SearchResponse, IndexError> {
        let response = self.post("/multi-search", request).await?;
        tracing::debug!(
            queries = request.queries.len(),
            hits = response.hits.len(),
            processing_time_ms = response.processing_time_ms,
            "Federated search complete"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_decodes_both_total_fields() {
        let estimated: SearchResponse = serde_json::from_str(
            r#"{"hits": [{"id": 1}], "estimatedTotalHits": 12, "processingTimeMs": 3}"#,
        )
        .expect("decode");
        assert_eq!(estimated.total_hits, Some(12));
        assert_eq!(estimated.processing_time_ms, 3);
        assert_eq!(estimated.hits.len(), 1);

        let exact: SearchResponse =
            serde_json::from_str(r#"{"hits": [], "totalHits": 0, "processingTimeMs": 1}"#).expect("decode");
        assert_eq!(exact.total_hits, Some(0));
    }

    #[test]
    fn test_search_request_omits_absent_fields() {
        let request = SearchRequest {
            q: "mercy".into(),
            limit: 10,
            ..Default::default()
        };
        let json = serde_json::to_value(&request).expect("serialize");
        let obj = json.as_object().expect("object");
        assert!(!obj.contains_key("filter"));
        assert!(!obj.contains_key("vector"));
        assert!(!obj.contains_key("hybrid"));
        assert_eq!(obj["limit"], 10);
    }

    #[test]
    fn test_client_rejects_empty_url() {
        let result = MeilisearchClient::new("  ".into(), None, Duration::from_secs(5));
        assert!(matches!(result, Err(IndexError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_unreachable_index_is_request_error() {
        let client = MeilisearchClient::new("http://127.0.0.1:9".into(), None, Duration::from_secs(2))
            .expect("client");
        let result = client.search("paragraphs", &SearchRequest::default()).await;
        assert!(matches!(result, Err(IndexError::Request(_))));
    }
}
