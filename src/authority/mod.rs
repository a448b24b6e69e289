/// Authority resolution
///
/// Maps document metadata to a 1–10 editorial/doctrinal weight through a fixed
/// precedence chain:
///   1. explicit `authority` on the document (clamped)
///   2. (religion, collection) default from the metadata tree
///   3. religion default from the metadata tree
///   4. author-name substring table
///   5. global default (5)
///
/// Defaults live in an immutable `AuthorityConfig` snapshot. `AuthorityResolver`
/// holds the current snapshot behind a single `Arc` that `reload` swaps, so
/// concurrent readers always see one complete snapshot.

pub mod authors;
pub mod loader;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

pub use loader::load_authority_config;

pub const MIN_AUTHORITY: u8 = 1;
pub const MAX_AUTHORITY: u8 = 10;
pub const DEFAULT_AUTHORITY: u8 = 5;

/// Document metadata consulted when resolving authority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityQuery {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub religion: String,
    #[serde(default)]
    pub collection: String,
    /// Explicit override; any integer is accepted and clamped
    #[serde(default)]
    pub authority: Option<i64>,
}

/// One entry of a batch lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityDoc {
    pub id: String,
    #[serde(flatten)]
    pub query: AuthorityQuery,
}

/// Immutable snapshot of religion and collection defaults.
#[derive(Debug, Clone, Default)]
pub struct AuthorityConfig {
    religions: HashMap<String, u8>,
    collections: HashMap<(String, String), u8>,
}

impl AuthorityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a religion-level default (clamped).
    pub fn with_religion(mut self, religion: impl Into<String>, authority: i64) -> Self {
        self.religions.insert(religion.into(), clamp_authority(authority));
        self
    }

    /// Set a collection-level default (clamped).
    pub fn with_collection(
        mut self,
        religion: impl Into<String>,
        collection: impl Into<String>,
        authority: i64,
    ) -> Self {
        self.collections
            .insert((religion.into(), collection.into()), clamp_authority(authority));
        self
    }

    pub fn religion_default(&self, religion: &str) -> Option<u8> {
        self.religions.get(religion).copied()
    }

    pub fn collection_default(&self, religion: &str, collection: &str) -> Option<u8> {
        // Tuple keys need owned lookups; both strings are short.
        self.collections
            .get(&(religion.to_string(), collection.to_string()))
            .copied()
    }

    pub fn religion_count(&self) -> usize {
        self.religions.len()
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Resolve a single document against this snapshot.
    pub fn resolve(&self, query: &AuthorityQuery) -> u8 {
        if let Some(explicit) = query.authority {
            return clamp_authority(explicit);
        }
        if let Some(score) = self.collection_default(&query.religion, &query.collection) {
            return score;
        }
        if let Some(score) = self.religion_default(&query.religion) {
            return score;
        }
        if let Some(score) = authors::score_for_author(&query.author) {
            return score;
        }
        DEFAULT_AUTHORITY
    }

    /// Resolve every document independently. Empty input yields an empty map.
    pub fn resolve_batch(&self, docs: &[AuthorityDoc]) -> HashMap<String, u8> {
        docs.iter()
            .map(|doc| (doc.id.clone(), self.resolve(&doc.query)))
            .collect()
    }
}

/// Clamp any integer into [1, 10].
pub fn clamp_authority(value: i64) -> u8 {
    value.clamp(MIN_AUTHORITY as i64, MAX_AUTHORITY as i64) as u8
}

/// Display label for an authority score. Out-of-range input is clamped first.
pub fn label_for(score: u8) -> &'static str {
    match score.clamp(MIN_AUTHORITY, MAX_AUTHORITY) {
        10 => "Sacred Text",
        9 => "Authoritative",
        8 => "Institutional",
        7 => "Official",
        6 => "Reference",
        5 => "Published",
        4 => "Historical",
        3 => "Research",
        2 => "Commentary",
        _ => "Unofficial",
    }
}

/// Process-wide handle to the current `AuthorityConfig` snapshot.
pub struct AuthorityResolver {
    current: RwLock<Arc<AuthorityConfig>>,
}

impl AuthorityResolver {
    pub fn new(config: AuthorityConfig) -> Self {
        AuthorityResolver {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Build a resolver from a metadata directory.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new(load_authority_config(dir))
    }

    /// The snapshot in effect right now. Holding it keeps it alive across reloads.
    pub fn snapshot(&self) -> Arc<AuthorityConfig> {
        let guard = self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn resolve(&self, query: &AuthorityQuery) -> u8 {
        self.snapshot().resolve(query)
    }

    pub fn resolve_batch(&self, docs: &[AuthorityDoc]) -> HashMap<String, u8> {
        self.snapshot().resolve_batch(docs)
    }

    /// Replace the snapshot wholesale.
    pub fn reload(&self, config: AuthorityConfig) {
        let next = Arc::new(config);
        let mut guard = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next;
    }

    /// Re-scan a metadata directory and swap in the result.
    pub fn reload_from_dir(&self, dir: &Path) {
        let config = load_authority_config(dir);
        tracing::info!(
            religions = config.religion_count(),
            collections = config.collection_count(),
            "Authority config reloaded"
        );
        self.reload(config);
    }
}

impl Default for AuthorityResolver {
    fn default() -> Self {
        Self::new(AuthorityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(author: &str, religion: &str, collection: &str, authority: Option<i64>) -> AuthorityQuery {
        AuthorityQuery {
            author: author.to_string(),
            religion: religion.to_string(),
            collection: collection.to_string(),
            authority,
        }
    }

    fn sample_config() -> AuthorityConfig {
        AuthorityConfig::new()
            .with_religion("Baha'i", 7)
            .with_collection("Baha'i", "Core Tablets", 10)
            .with_collection("Baha'i", "Pilgrim Notes", 2)
            .with_religion("Islam", 6)
    }

    #[test]
    fn test_explicit_authority_clamped() {
        let config = sample_config();
        assert_eq!(config.resolve(&query("", "", "", Some(15))), 10);
        assert_eq!(config.resolve(&query("", "", "", Some(0))), 1);
        assert_eq!(config.resolve(&query("", "", "", Some(-3))), 1);
        assert_eq!(config.resolve(&query("", "", "", Some(8))), 8);
    }

    #[test]
    fn test_explicit_authority_beats_everything() {
        let config = sample_config();
        let q = query("Bahá'u'lláh", "Baha'i", "Core Tablets", Some(3));
        assert_eq!(config.resolve(&q), 3);
    }

    #[test]
    fn test_collection_beats_author() {
        let config = sample_config();
        // Author alone would score 10; curated collection says 2
        let q = query("Bahá'u'lláh", "Baha'i", "Pilgrim Notes", None);
        assert_eq!(config.resolve(&q), 2);
    }

    #[test]
    fn test_collection_beats_religion() {
        let config = sample_config();
        assert_eq!(config.resolve(&query("", "Baha'i", "Core Tablets", None)), 10);
    }

    #[test]
    fn test_religion_beats_author() {
        let config = sample_config();
        let q = query("Bahá'u'lláh", "Baha'i", "Unlisted Collection", None);
        assert_eq!(config.resolve(&q), 7);
    }

    #[test]
    fn test_author_fallback_without_religion_default() {
        let config = sample_config();
        let q = query("Shoghi Effendi", "Unknown Faith", "Letters", None);
        assert_eq!(config.resolve(&q), 9);
    }

    #[test]
    fn test_collection_lookup_scoped_to_religion() {
        let config = sample_config();
        // Same collection name under another religion does not match
        assert_eq!(config.resolve(&query("", "Islam", "Core Tablets", None)), 6);
    }

    #[test]
    fn test_empty_query_is_default() {
        assert_eq!(sample_config().resolve(&AuthorityQuery::default()), 5);
        assert_eq!(AuthorityConfig::new().resolve(&AuthorityQuery::default()), 5);
    }

    #[test]
    fn test_resolve_batch() {
        let config = sample_config();
        let docs = vec![
            AuthorityDoc { id: "a".into(), query: query("", "Baha'i", "Core Tablets", None) },
            AuthorityDoc { id: "b".into(), query: query("", "", "", Some(42)) },
            AuthorityDoc { id: "c".into(), query: AuthorityQuery::default() },
        ];
        let scores = config.resolve_batch(&docs);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores["a"], 10);
        assert_eq!(scores["b"], 10);
        assert_eq!(scores["c"], 5);
    }

    #[test]
    fn test_resolve_batch_empty() {
        assert!(sample_config().resolve_batch(&[]).is_empty());
    }

    #[test]
    fn test_labels() {
        let expected = [
            (10, "Sacred Text"),
            (9, "Authoritative"),
            (8, "Institutional"),
            (7, "Official"),
            (6, "Reference"),
            (5, "Published"),
            (4, "Historical"),
            (3, "Research"),
            (2, "Commentary"),
            (1, "Unofficial"),
        ];
        for (score, label) in expected {
            assert_eq!(label_for(score), label);
        }
    }

    #[test]
    fn test_config_values_clamped_on_insert() {
        let config = AuthorityConfig::new().with_religion("X", 99).with_collection("X", "Y", -1);
        assert_eq!(config.religion_default("X"), Some(10));
        assert_eq!(config.collection_default("X", "Y"), Some(1));
    }

    #[test]
    fn test_resolver_reload_swaps_snapshot() {
        let resolver = AuthorityResolver::new(sample_config());
        let q = query("", "Baha'i", "", None);
        assert_eq!(resolver.resolve(&q), 7);

        let old = resolver.snapshot();
        resolver.reload(AuthorityConfig::new().with_religion("Baha'i", 4));
        assert_eq!(resolver.resolve(&q), 4);
        // A snapshot taken before reload is unaffected
        assert_eq!(old.resolve(&q), 7);

        resolver.reload(AuthorityConfig::new());
        assert_eq!(resolver.resolve(&q), 5);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = AuthorityResolver::new(sample_config());
        let q = query("Shoghi Effendi", "Hinduism", "Gita", None);
        assert_eq!(resolver.resolve(&q), resolver.resolve(&q));
    }
}
