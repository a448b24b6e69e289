/// Domain-specific error types for scripture-search
///
/// Expected conditions (unmatched anchors, missing metadata, empty filter groups)
/// are modelled as `Option`/fallbacks, not errors. Only external collaborator
/// failures and invalid caller input reach this type.

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Search index error: {0}")]
    Index(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::embedding::EmbeddingError> for SearchError {
    fn from(e: crate::embedding::EmbeddingError) -> Self {
        SearchError::Embedding(e.to_string())
    }
}

impl From<crate::search::client::IndexError> for SearchError {
    fn from(e: crate::search::client::IndexError) -> Self {
        SearchError::Index(e.to_string())
    }
}

impl From<crate::highlight::provider::AnchorError> for SearchError {
    fn from(e: crate::highlight::provider::AnchorError) -> Self {
        SearchError::Internal(e.to_string())
    }
}

impl SearchError {
    /// Helper to create validation errors with field names
    ///
    /// Example:
    /// ```
    /// use scripture_search::errors::SearchError;
    /// let err = SearchError::validation("queries", "Research plan has no queries");
    /// ```
    pub fn validation(field: &str, message: &str) -> Self {
        SearchError::Validation {
            message: message.to_string(),
            field: Some(field.to_string()),
        }
    }
}
