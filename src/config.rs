/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: scripture.toml (in working directory)
/// 3. Environment variables: prefixed SCRIPTURE_ (e.g., SCRIPTURE_LOG_LEVEL=debug,
///    SCRIPTURE_INDEX__URL=http://search:7700 for nested sections)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::SearchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional file path for log output (in addition to stderr)
    #[serde(default)]
    pub log_file: Option<String>,

    /// Root of the religion/collection metadata tree used for authority defaults
    #[serde(default = "default_metadata_dir")]
    pub metadata_dir: String,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub anchors: AnchorConfig,
}

/// Search index connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Index holding paragraph documents
    #[serde(default = "default_index_name")]
    pub index_name: String,
    /// Embedder name registered on the index, sent with every hybrid query
    #[serde(default = "default_embedder")]
    pub embedder: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Only "openai" (or any OpenAI-compatible endpoint) is supported
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

/// Research plan execution tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Limit assumed for a query that does not set one
    #[serde(default = "default_query_limit")]
    pub default_query_limit: usize,
    /// Global cap on the summed per-query limits
    #[serde(default = "default_max_total_limit")]
    pub max_total_limit: usize,
    /// Semantic ratio for `hybrid` mode queries
    #[serde(default = "default_hybrid_ratio")]
    pub hybrid_semantic_ratio: f32,
    /// Semantic ratio for `semantic` mode queries
    #[serde(default = "default_semantic_ratio")]
    pub semantic_mode_ratio: f32,
    /// Authority re-ranking strength; 0.0 keeps index order
    #[serde(default)]
    pub authority_boost: f64,
}

/// LLM anchor provider settings (sentence highlighting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_anchor_model")]
    pub model: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metadata_dir() -> String {
    "library".to_string()
}

fn default_index_url() -> String {
    "http://localhost:7700".to_string()
}

fn default_index_name() -> String {
    "paragraphs".to_string()
}

fn default_embedder() -> String {
    "default".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_query_limit() -> usize {
    10
}

fn default_max_total_limit() -> usize {
    50
}

fn default_hybrid_ratio() -> f32 {
    0.5
}

fn default_semantic_ratio() -> f32 {
    1.0
}

fn default_anchor_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            url: default_index_url(),
            api_key: None,
            index_name: default_index_name(),
            embedder: default_embedder(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        EmbeddingConfig {
            provider: default_embedding_provider(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        ResearchConfig {
            default_query_limit: default_query_limit(),
            max_total_limit: default_max_total_limit(),
            hybrid_semantic_ratio: default_hybrid_ratio(),
            semantic_mode_ratio: default_semantic_ratio(),
            authority_boost: 0.0,
        }
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        AnchorConfig {
            enabled: false,
            openai_base_url: default_openai_base_url(),
            openai_api_key: None,
            model: default_anchor_model(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            log_file: None,
            metadata_dir: default_metadata_dir(),
            index: IndexConfig::default(),
            embedding: EmbeddingConfig::default(),
            research: ResearchConfig::default(),
            anchors: AnchorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: SCRIPTURE_LOG_LEVEL=debug overrides log_level in scripture.toml
    pub fn load() -> Result<Config, SearchError> {
        Self::load_from("scripture.toml")
    }

    /// Same as [`Config::load`] with an explicit TOML path (missing file is fine).
    pub fn load_from(path: &str) -> Result<Config, SearchError> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("SCRIPTURE_").split("__"))
            .extract()
            .map_err(|e| SearchError::Config(format!("Failed to load config: {}", e)))
    }
}
