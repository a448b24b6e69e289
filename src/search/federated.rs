/// Federated (multi-query) request assembly
///
/// The index merges several sub-queries into one ranked list. It rejects a
/// federated request if any sub-query carries its own `limit`, so pagination
/// lives only on the `federation` envelope. Keyword sub-queries must omit the
/// `vector` and `hybrid` keys entirely; empty filters are omitted too.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 20;
pub const DEFAULT_SEMANTIC_RATIO: f32 = 0.5;

/// One logical query before it is bound to an index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FederatedQuery {
    pub text: String,
    pub filter: Option<String>,
    pub vector: Option<Vec<f32>>,
    /// Blend of keyword (0.0) and vector (1.0) scoring; only used with a vector
    pub semantic_ratio: Option<f32>,
}

impl FederatedQuery {
    pub fn keyword(text: impl Into<String>) -> Self {
        FederatedQuery {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn hybrid(text: impl Into<String>, vector: Vec<f32>, semantic_ratio: Option<f32>) -> Self {
        FederatedQuery {
            text: text.into(),
            vector: Some(vector),
            semantic_ratio,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}

/// Hybrid scoring block sent alongside a vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridConfig {
    pub semantic_ratio: f32,
    pub embedder: String,
}

/// Wire form of one sub-query. Deliberately has no `limit`/`offset` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuery {
    pub index_uid: String,
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid: Option<HybridConfig>,
    pub show_ranking_score: bool,
}

/// Pagination for the merged result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Federation {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Federation {
    fn default() -> Self {
        Federation {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Complete multi-search body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederatedRequest {
    pub federation: Federation,
    pub queries: Vec<IndexQuery>,
}

/// Binds logical queries to one index and embedder.
#[derive(Debug, Clone)]
pub struct FederatedQueryBuilder {
    index_uid: String,
    embedder: String,
}

impl FederatedQueryBuilder {
    pub fn new(index_uid: impl Into<String>, embedder: impl Into<String>) -> Self {
        FederatedQueryBuilder {
            index_uid: index_uid.into(),
            embedder: embedder.into(),
        }
    }

    /// Convert one logical query to its wire form.
    pub fn index_query(&self, query: &FederatedQuery) -> IndexQuery {
        let filter = query
            .filter
            .as_ref()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        let hybrid = query.vector.as_ref().map(|_| HybridConfig {
            semantic_ratio: query
                .semantic_ratio
                .filter(|ratio| ratio.is_finite())
                .unwrap_or(DEFAULT_SEMANTIC_RATIO)
                .clamp(0.0, 1.0),
            embedder: self.embedder.clone(),
        });

        IndexQuery {
            index_uid: self.index_uid.clone(),
            q: query.text.clone(),
            filter,
            vector: query.vector.clone(),
            hybrid,
            show_ranking_score: true,
        }
    }

    pub fn build(&self, queries: &[FederatedQuery], limit: usize, offset: usize) -> FederatedRequest {
        FederatedRequest {
            federation: Federation { limit, offset },
            queries: queries.iter().map(|q| self.index_query(q)).collect(),
        }
    }

    /// `build` with the default page (limit 20, offset 0).
    pub fn build_default(&self, queries: &[FederatedQuery]) -> FederatedRequest {
        let page = Federation::default();
        self.build(queries, page.limit, page.offset)
    }
}
