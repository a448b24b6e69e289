/// OpenAI embedding provider
///
/// Calls the OpenAI Embeddings API (or any compatible endpoint) using reqwest.
/// The whole batch goes out as one request; the response is re-ordered by each
/// item's `index` so output order always matches input order.
/// Requires SCRIPTURE_EMBEDDING__OPENAI_API_KEY or embedding.openai_api_key in config.

use async_trait::async_trait;

use super::{validate_batch, EmbeddingError, EmbeddingProvider};

/// Request body for the Embeddings API
#[derive(serde::Serialize)]
struct EmbedRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

/// Response from the Embeddings API
#[derive(serde::Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

/// Single embedding result
#[derive(serde::Deserialize)]
struct EmbedData {
    /// Some compatible endpoints omit this; response order is used then
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// OpenAI-backed embedding provider.
///
/// Requires a valid API key; validated on construction, not at embed time.
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dim: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a new OpenAIEmbeddingProvider.
    ///
    /// # Errors
    /// Returns `EmbeddingError::NotConfigured` if api_key is empty.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        dim: usize,
    ) -> Result<Self, EmbeddingError> {
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::NotConfigured(
                "OpenAI API key is required when using the openai embedding provider. \
                 Set SCRIPTURE_EMBEDDING__OPENAI_API_KEY or embedding.openai_api_key in scripture.toml"
                    .to_string(),
            ));
        }

        Ok(OpenAIEmbeddingProvider {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            dim,
        })
    }
}

/// Place each item at its reported index. Duplicate or out-of-range indices are an error.
fn order_by_index(mut data: Vec<EmbedData>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if data.iter().any(|d| d.index.is_none()) {
        return Ok(data.into_iter().map(|d| d.embedding).collect());
    }
    data.sort_by_key(|d| d.index);
    for (position, item) in data.iter().enumerate() {
        if item.index != Some(position) {
            return Err(EmbeddingError::Generation(format!(
                "Embedding response has unexpected index {:?} at position {}",
                item.index, position
            )));
        }
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            input: texts,
            model: &self.model,
        };

        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Generation(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(EmbeddingError::Api {
                status,
                message: body,
            });
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Generation(format!("Failed to parse API response: {}", e)))?;

        let vectors = order_by_index(embed_response.data)?;
        validate_batch(&vectors, texts.len(), self.dim)?;
        tracing::debug!(count = vectors.len(), model = %self.model, "Embedded batch");
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let result = OpenAIEmbeddingProvider::new(
            "https://api.openai.com/v1".into(),
            "".into(),
            "text-embedding-3-small".into(),
            1536,
        );
        assert!(matches!(result, Err(EmbeddingError::NotConfigured(_))));
    }

    #[test]
    fn test_order_by_index() {
        let data = vec![
            EmbedData { index: Some(1), embedding: vec![1.0] },
            EmbedData { index: Some(0), embedding: vec![0.0] },
        ];
        assert_eq!(order_by_index(data).expect("ordered"), vec![vec![0.0], vec![1.0]]);
    }

    #[test]
    fn test_order_by_index_rejects_gaps() {
        let data = vec![
            EmbedData { index: Some(0), embedding: vec![0.0] },
            EmbedData { index: Some(2), embedding: vec![2.0] },
        ];
        assert!(order_by_index(data).is_err());
    }

    #[test]
    fn test_order_without_indices_keeps_response_order() {
        let data = vec![
            EmbedData { index: None, embedding: vec![5.0] },
            EmbedData { index: None, embedding: vec![3.0] },
        ];
        assert_eq!(order_by_index(data).expect("ordered"), vec![vec![5.0], vec![3.0]]);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        // Unroutable base URL: any request would fail
        let provider = OpenAIEmbeddingProvider::new(
            "http://127.0.0.1:9".into(),
            "key".into(),
            "m".into(),
            3,
        )
        .expect("provider");
        assert!(provider.embed_batch(&[]).await.expect("no request").is_empty());
    }
}
