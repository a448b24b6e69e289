pub mod client;
pub mod federated;

pub use client::{IndexError, MeilisearchClient, SearchIndex, SearchRequest, SearchResponse};
pub use federated::{FederatedQuery, FederatedQueryBuilder, FederatedRequest, IndexQuery};

use serde::{Deserialize, Serialize};

use crate::authority::{label_for, AuthorityConfig, AuthorityQuery, DEFAULT_AUTHORITY};

/// A paragraph hit annotated with its resolved authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub title: String,
    pub author: String,
    pub religion: String,
    pub collection: String,
    /// Index relevance (federation-weighted when available)
    pub ranking_score: f64,
    /// Position of the sub-query that produced this hit, for federated results
    pub query_position: Option<usize>,
    pub authority: u8,
    pub authority_label: String,
    /// Relevance after authority weighting; equals ranking_score when boost is 0
    pub score: f64,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    religion: Option<String>,
    #[serde(default)]
    collection: Option<String>,
    /// Documents store this as an integer, but some ingest paths wrote floats
    #[serde(default)]
    authority: Option<serde_json::Value>,
    #[serde(default, rename = "_rankingScore")]
    ranking_score: Option<f64>,
    #[serde(default, rename = "_federation")]
    federation: Option<FederationMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FederationMeta {
    #[serde(default)]
    queries_position: Option<usize>,
    #[serde(default)]
    weighted_ranking_score: Option<f64>,
}

/// Scale a relevance score by authority.
///
/// `boost` of 0.0 leaves the score untouched; at 1.0 a Sacred Text (10) doubles
/// and an Unofficial (1) source drops to 20%.
pub fn authority_weighted(score: f64, authority: u8, boost: f64) -> f64 {
    let offset = (authority as f64 - DEFAULT_AUTHORITY as f64) / DEFAULT_AUTHORITY as f64;
    score * (1.0 + boost * offset)
}

/// Decode raw index hits, resolve authority for each, and apply authority weighting.
///
/// Undecodable hits are skipped. With a non-zero boost the hits are re-sorted
/// by weighted score (stable, so equal scores keep index order).
pub fn annotate_hits(raw: Vec<serde_json::Value>, authority: &AuthorityConfig, boost: f64) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawHit>(value) {
            Ok(hit) => Some(annotate(hit, authority, boost)),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed search hit");
                None
            }
        })
        .collect();

    if boost != 0.0 {
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    }
    hits
}

fn annotate(hit: RawHit, authority: &AuthorityConfig, boost: f64) -> SearchHit {
    let query = AuthorityQuery {
        author: hit.author.unwrap_or_default(),
        religion: hit.religion.unwrap_or_default(),
        collection: hit.collection.unwrap_or_default(),
        authority: hit.authority.as_ref().and_then(explicit_authority),
    };
    let resolved = authority.resolve(&query);

    let weighted = hit.federation.as_ref().and_then(|f| f.weighted_ranking_score);
    let ranking_score = weighted.or(hit.ranking_score).unwrap_or(0.0);

    let id = match hit.id {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };

    SearchHit {
        id,
        text: hit.text.unwrap_or_default(),
        title: hit.title.unwrap_or_default(),
        author: query.author,
        religion: query.religion,
        collection: query.collection,
        ranking_score,
        query_position: hit.federation.and_then(|f| f.queries_position),
        authority: resolved,
        authority_label: label_for(resolved).to_string(),
        score: authority_weighted(ranking_score, resolved, boost),
    }
}

fn explicit_authority(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}
