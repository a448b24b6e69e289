/// Free-text query parsing
///
/// A query may end with a parenthetical filter group, e.g.
/// `what is justice (shoghi, tablets)`. Only a group that closes the query
/// counts; parentheses elsewhere are ordinary query text.

pub mod filter;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use filter::{build_filter_expression, combine_filters, ScopeFilter};

/// Result of splitting a raw query into search text and filter terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub clean_query: String,
    /// Lowercased, in the order written; duplicates kept
    pub filter_terms: Vec<String>,
}

impl ParsedQuery {
    pub fn has_filters(&self) -> bool {
        !self.filter_terms.is_empty()
    }

    /// Index filter expression for the parenthetical terms, if any.
    pub fn filter_expression(&self) -> Option<String> {
        build_filter_expression(&self.filter_terms)
    }
}

fn trailing_group() -> &'static Regex {
    static TRAILING_GROUP: OnceLock<Regex> = OnceLock::new();
    TRAILING_GROUP.get_or_init(|| {
        Regex::new(r"\(([^)]*)\)\s*$").expect("trailing group pattern is valid")
    })
}

/// Split `raw` into a clean query and its trailing filter terms.
///
/// An empty or whitespace-only group such as `prayer ()` yields no terms and the
/// parenthetical is left in `clean_query` untouched.
pub fn parse(raw: &str) -> ParsedQuery {
    let Some(captures) = trailing_group().captures(raw) else {
        return unfiltered(raw);
    };
    let (Some(group), Some(inner)) = (captures.get(0), captures.get(1)) else {
        return unfiltered(raw);
    };

    let filter_terms: Vec<String> = inner
        .as_str()
        .split(',')
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect();

    if filter_terms.is_empty() {
        return unfiltered(raw);
    }

    ParsedQuery {
        clean_query: raw[..group.start()].trim().to_string(),
        filter_terms,
    }
}

fn unfiltered(raw: &str) -> ParsedQuery {
    ParsedQuery {
        clean_query: raw.trim().to_string(),
        filter_terms: Vec::new(),
    }
}
