use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use scripture_search::authority::{label_for, AuthorityQuery, AuthorityResolver};
use scripture_search::config::Config;
use scripture_search::embedding::EmbeddingProvider;
use scripture_search::embedding::openai::OpenAIEmbeddingProvider;
use scripture_search::highlight::{self, find_sentence, mark_span, AnchorProvider, OpenAIAnchorProvider};
use scripture_search::logging;
use scripture_search::query::{self, ScopeFilter};
use scripture_search::research::{ResearchExecutor, ResearchPlan};
use scripture_search::search::{FederatedQueryBuilder, MeilisearchClient, SearchIndex};

#[derive(Parser)]
#[command(name = "scripture-search", version, about = "Hybrid retrieval over a multi-religion corpus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the authority score of one document
    Authority {
        #[arg(long, default_value = "")]
        author: String,
        #[arg(long, default_value = "")]
        religion: String,
        #[arg(long, default_value = "")]
        collection: String,
        /// Explicit override (clamped to 1-10)
        #[arg(long, allow_negative_numbers = true)]
        authority: Option<i64>,
    },
    /// Split a query into search text and trailing filter terms
    Parse {
        query: String,
    },
    /// Locate and mark a sentence inside a paragraph
    Highlight {
        paragraph: String,
        /// Start anchor (used with --end)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// End anchor (used with --start)
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Ask the configured LLM for anchors answering this query
        #[arg(long, conflicts_with = "start")]
        query: Option<String>,
    },
    /// Execute a JSON research plan against the configured index
    Research {
        plan: PathBuf,
        /// Restrict every query to one religion
        #[arg(long)]
        religion: Option<String>,
    },
}

/// Create the embedding provider based on configuration.
fn create_embedding_provider(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding.provider.as_str() {
        "openai" => {
            let api_key = config.embedding.openai_api_key.clone()
                .ok_or_else(|| anyhow::anyhow!(
                    "OpenAI API key required when embedding provider is 'openai'. \
                     Set SCRIPTURE_EMBEDDING__OPENAI_API_KEY or embedding.openai_api_key in scripture.toml"
                ))?;
            Ok(Arc::new(OpenAIEmbeddingProvider::new(
                config.embedding.openai_base_url.clone(),
                api_key,
                config.embedding.model.clone(),
                config.embedding.dimension,
            )?))
        }
        other => anyhow::bail!("Unknown embedding provider '{}'", other),
    }
}

/// Create the search index client based on configuration.
fn create_index_client(config: &Config) -> Result<Arc<dyn SearchIndex>> {
    let client = MeilisearchClient::new(
        config.index.url.clone(),
        config.index.api_key.clone(),
        Duration::from_secs(config.index.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

/// Create the LLM anchor provider based on configuration.
fn create_anchor_provider(config: &Config) -> Result<Arc<dyn AnchorProvider>> {
    if !config.anchors.enabled {
        anyhow::bail!("LLM anchors are disabled. Set anchors.enabled = true in scripture.toml");
    }
    let api_key = config.anchors.openai_api_key.clone()
        .ok_or_else(|| anyhow::anyhow!(
            "API key required for LLM anchors. \
             Set SCRIPTURE_ANCHORS__OPENAI_API_KEY or anchors.openai_api_key in scripture.toml"
        ))?;
    Ok(Arc::new(OpenAIAnchorProvider::new(
        config.anchors.openai_base_url.clone(),
        api_key,
        config.anchors.model.clone(),
    )?))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // 3. Initialize logging before any other output (stderr only; stdout carries results)
    logging::init_logging(&config);

    match cli.command {
        Commands::Authority { author, religion, collection, authority } => {
            let resolver = AuthorityResolver::from_dir(Path::new(&config.metadata_dir));
            let score = resolver.resolve(&AuthorityQuery { author, religion, collection, authority });
            println!("{} ({})", score, label_for(score));
        }

        Commands::Parse { query: raw } => {
            let parsed = query::parse(&raw);
            let output = serde_json::json!({
                "clean_query": parsed.clean_query,
                "filter_terms": parsed.filter_terms,
                "filter": parsed.filter_expression(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Highlight { paragraph, start, end, query } => {
            let span = match (start, end, query) {
                (Some(start), Some(end), _) => find_sentence(&paragraph, &start, &end),
                (_, _, Some(query)) => {
                    let provider = create_anchor_provider(&config)?;
                    highlight::highlight_passage(provider.as_ref(), &query, &paragraph).await?
                }
                _ => anyhow::bail!("Pass either --start and --end, or --query"),
            };
            match span {
                Some(span) => println!("{}", mark_span(&paragraph, &span)),
                None => {
                    tracing::info!("No sentence located");
                    println!("{}", paragraph);
                }
            }
        }

        Commands::Research { plan, religion } => {
            let body = std::fs::read_to_string(&plan)
                .with_context(|| format!("Failed to read research plan {}", plan.display()))?;
            let plan: ResearchPlan = serde_json::from_str(&body)
                .with_context(|| format!("Invalid research plan {}", plan.display()))?;

            let executor = ResearchExecutor::new(
                create_embedding_provider(&config)?,
                create_index_client(&config)?,
                Arc::new(AuthorityResolver::from_dir(Path::new(&config.metadata_dir))),
                FederatedQueryBuilder::new(config.index.index_name.clone(), config.index.embedder.clone()),
                config.research.clone(),
            );

            let scope = religion.map(ScopeFilter::religion).unwrap_or_default();
            let results = executor.execute_scoped(&plan, &scope).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}
