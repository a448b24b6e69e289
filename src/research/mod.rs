/// Research plan execution
///
/// A research plan is a set of queries, each tagged semantic / hybrid / keyword
/// with its own result limit. Execution:
///   1. parse each query for a trailing filter group
///   2. embed every non-keyword query in one batched call
///   3. sum the per-query limits (default 10) and cap the total (default 50)
///   4. build one federated request and send it to the index
///   5. annotate hits with resolved authority
///
/// An embedding failure fails the whole plan. Falling back to keyword-only
/// search is the caller's decision.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::authority::AuthorityResolver;
use crate::config::ResearchConfig;
use crate::embedding::{validate_batch, EmbeddingProvider};
use crate::errors::SearchError;
use crate::query::{self, combine_filters, ScopeFilter};
use crate::search::{annotate_hits, FederatedQuery, FederatedQueryBuilder, SearchHit, SearchIndex};

/// How a research query is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Vector similarity dominates
    Semantic,
    /// Even keyword/vector blend
    #[default]
    Hybrid,
    /// Full-text only, no embedding
    Keyword,
}

impl QueryMode {
    pub fn needs_vector(self) -> bool {
        self != QueryMode::Keyword
    }
}

/// One query of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchQuery {
    pub query: String,
    #[serde(default)]
    pub mode: QueryMode,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub filters: Option<ScopeFilter>,
}

impl ResearchQuery {
    pub fn new(query: impl Into<String>, mode: QueryMode) -> Self {
        ResearchQuery {
            query: query.into(),
            mode,
            limit: None,
            filters: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A plan as produced upstream. `traditions`, `assumptions` and `surprises`
/// are carried through for presentation only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub queries: Vec<ResearchQuery>,
    #[serde(default)]
    pub traditions: String,
    #[serde(default)]
    pub assumptions: String,
    #[serde(default)]
    pub surprises: String,
}

/// Aggregated outcome of one plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResults {
    pub hits: Vec<SearchHit>,
    pub total_hits: Option<u64>,
    pub processing_time_ms: u64,
    /// Federation limit actually requested
    pub limit: usize,
    pub query_count: usize,
    pub embedded_count: usize,
}

/// Sum of per-query limits, `default_limit` for unset ones, capped at `max_total`.
pub fn total_limit(queries: &[ResearchQuery], default_limit: usize, max_total: usize) -> usize {
    queries
        .iter()
        .map(|q| q.limit.unwrap_or(default_limit))
        .fold(0usize, |acc, limit| acc.saturating_add(limit))
        .min(max_total)
}

/// A query needs search text unless it is a keyword query narrowed by a
/// filter group, which the index serves as a filtered placeholder search.
fn validate_queries(queries: &[ResearchQuery], parsed: &[query::ParsedQuery]) -> Result<(), SearchError> {
    for (position, (research_query, parsed_query)) in queries.iter().zip(parsed).enumerate() {
        if !parsed_query.clean_query.is_empty() {
            continue;
        }
        if research_query.mode.needs_vector() || !parsed_query.has_filters() {
            return Err(SearchError::validation(
                &format!("queries[{}].query", position),
                "Query has no search text",
            ));
        }
    }
    Ok(())
}

/// Executes research plans against an embedding service and a search index.
pub struct ResearchExecutor {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SearchIndex>,
    authority: Arc<AuthorityResolver>,
    builder: FederatedQueryBuilder,
    config: ResearchConfig,
}

impl ResearchExecutor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn SearchIndex>,
        authority: Arc<AuthorityResolver>,
        builder: FederatedQueryBuilder,
        config: ResearchConfig,
    ) -> Self {
        ResearchExecutor {
            embedder,
            index,
            authority,
            builder,
            config,
        }
    }

    pub async fn execute(&self, plan: &ResearchPlan) -> Result<ResearchResults, SearchError> {
        self.execute_scoped(plan, &ScopeFilter::default()).await
    }

    /// Execute with a caller-supplied scope (e.g., the selected religion) ANDed
    /// into every query's filter.
    pub async fn execute_scoped(
        &self,
        plan: &ResearchPlan,
        scope: &ScopeFilter,
    ) -> Result<ResearchResults, SearchError> {
        if plan.queries.is_empty() {
            return Ok(ResearchResults::default());
        }

        let parsed: Vec<query::ParsedQuery> = plan.queries.iter().map(|q| query::parse(&q.query)).collect();
        validate_queries(&plan.queries, &parsed)?;

        let to_embed: Vec<String> = plan
            .queries
            .iter()
            .zip(&parsed)
            .filter(|(q, _)| q.mode.needs_vector())
            .map(|(_, p)| p.clean_query.clone())
            .collect();

        let vectors = self.embed(&to_embed).await?;
        let mut vectors = vectors.into_iter();

        let scope_filter = scope.expression();
        let mut federated = Vec::with_capacity(plan.queries.len());
        for (research_query, parsed_query) in plan.queries.iter().zip(&parsed) {
            let filter = combine_filters([
                scope_filter.clone(),
                research_query.filters.as_ref().and_then(ScopeFilter::expression),
                parsed_query.filter_expression(),
            ]);

            let query = match research_query.mode {
                QueryMode::Keyword => FederatedQuery::keyword(parsed_query.clean_query.clone()),
                mode => {
                    let vector = vectors.next().ok_or_else(|| {
                        SearchError::Internal("Fewer embeddings than vector queries".to_string())
                    })?;
                    let ratio = match mode {
                        QueryMode::Semantic => self.config.semantic_mode_ratio,
                        _ => self.config.hybrid_semantic_ratio,
                    };
                    FederatedQuery::hybrid(parsed_query.clean_query.clone(), vector, Some(ratio))
                }
            };
            federated.push(query.with_filter(filter));
        }

        let limit = total_limit(
            &plan.queries,
            self.config.default_query_limit,
            self.config.max_total_limit,
        );
        let request = self.builder.build(&federated, limit, 0);
        let response = self.index.federated_search(&request).await?;

        let snapshot = self.authority.snapshot();
        let hits = annotate_hits(response.hits, &snapshot, self.config.authority_boost);

        tracing::info!(
            queries = plan.queries.len(),
            embedded = to_embed.len(),
            limit,
            hits = hits.len(),
            processing_time_ms = response.processing_time_ms,
            "Research plan executed"
        );

        Ok(ResearchResults {
            hits,
            total_hits: response.total_hits,
            processing_time_ms: response.processing_time_ms,
            limit,
            query_count: plan.queries.len(),
            embedded_count: to_embed.len(),
        })
    }

    /// One batched embedding call; an empty batch never reaches the service.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SearchError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(count = texts.len(), model = self.embedder.model_name(), "Embedding research queries");
        let vectors = self.embedder.embed_batch(texts).await.map_err(|e| {
            tracing::error!(error = %e, count = texts.len(), "Embedding batch failed");
            SearchError::from(e)
        })?;
        validate_batch(&vectors, texts.len(), self.embedder.dimension())?;
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(n: usize, limit: Option<usize>) -> Vec<ResearchQuery> {
        (0..n)
            .map(|i| ResearchQuery {
                query: format!("q{}", i),
                mode: QueryMode::Hybrid,
                limit,
                filters: None,
            })
            .collect()
    }

    #[test]
    fn test_total_limit_under_cap() {
        assert_eq!(total_limit(&queries(4, Some(10)), 10, 50), 40);
    }

    #[test]
    fn test_total_limit_capped() {
        assert_eq!(total_limit(&queries(10, Some(10)), 10, 50), 50);
    }

    #[test]
    fn test_total_limit_defaults_unset() {
        assert_eq!(total_limit(&queries(3, None), 10, 50), 30);
        let mut mixed = queries(2, None);
        mixed.push(ResearchQuery::new("x", QueryMode::Keyword).with_limit(5));
        assert_eq!(total_limit(&mixed, 10, 50), 25);
    }

    #[test]
    fn test_total_limit_empty_and_overflow() {
        assert_eq!(total_limit(&[], 10, 50), 0);
        assert_eq!(total_limit(&queries(2, Some(usize::MAX)), 10, 50), 50);
    }

    #[test]
    fn test_validate_queries() {
        let check = |queries: Vec<ResearchQuery>| {
            let parsed: Vec<_> = queries.iter().map(|q| query::parse(&q.query)).collect();
            validate_queries(&queries, &parsed)
        };

        assert!(check(vec![ResearchQuery::new("soul", QueryMode::Hybrid)]).is_ok());
        // Filter-only keyword query is a placeholder search
        assert!(check(vec![ResearchQuery::new("(tablets)", QueryMode::Keyword)]).is_ok());

        match check(vec![
            ResearchQuery::new("soul", QueryMode::Hybrid),
            ResearchQuery::new("  ", QueryMode::Keyword),
        ]) {
            Err(SearchError::Validation { field, .. }) => {
                assert_eq!(field.as_deref(), Some("queries[1].query"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        // Nothing to embed
        assert!(matches!(
            check(vec![ResearchQuery::new("(tablets)", QueryMode::Semantic)]),
            Err(SearchError::Validation { .. })
        ));
    }

    #[test]
    fn test_mode_deserialize() {
        let q: ResearchQuery =
            serde_json::from_str(r#"{"query": "soul", "mode": "semantic", "limit": 5}"#).expect("json");
        assert_eq!(q.mode, QueryMode::Semantic);
        assert_eq!(q.limit, Some(5));

        let q: ResearchQuery = serde_json::from_str(r#"{"query": "soul"}"#).expect("json");
        assert_eq!(q.mode, QueryMode::Hybrid);
        assert!(q.mode.needs_vector());
        assert!(!QueryMode::Keyword.needs_vector());
    }

    #[test]
    fn test_plan_deserialize_with_presentation_fields() {
        let plan: ResearchPlan = serde_json::from_str(
            r#"{
                "queries": [{"query": "justice (shoghi)", "mode": "keyword"}],
                "traditions": "Baha'i, Islam",
                "assumptions": "modern usage",
                "surprises": ""
            }"#,
        )
        .expect("json");
        assert_eq!(plan.queries.len(), 1);
        assert_eq!(plan.traditions, "Baha'i, Islam");
    }
}
