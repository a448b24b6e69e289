/// Index filter expression assembly
///
/// Parenthetical terms become one OR group matched against author, collection and
/// title. Structured scope (religion, collection, author) becomes equality clauses.
/// Callers AND the pieces together with `combine_filters`.

use serde::{Deserialize, Serialize};

/// Attributes a parenthetical term may match.
const TERM_FIELDS: [&str; 3] = ["author", "collection", "title"];

/// Structured scope applied on top of free-text filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFilter {
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl ScopeFilter {
    pub fn religion(religion: impl Into<String>) -> Self {
        ScopeFilter {
            religion: Some(religion.into()),
            ..Default::default()
        }
    }

    /// Equality clauses ANDed together; None when no field is set.
    pub fn expression(&self) -> Option<String> {
        let clauses: Vec<String> = [
            ("religion", &self.religion),
            ("collection", &self.collection),
            ("author", &self.author),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{} = {}", field, quote(v)))
        })
        .collect();

        if clauses.is_empty() {
            None
        } else {
            Some(clauses.join(" AND "))
        }
    }
}

/// Build `((author CONTAINS t) OR (collection CONTAINS t) OR (title CONTAINS t) OR ...)`.
pub fn build_filter_expression(terms: &[String]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    let groups: Vec<String> = terms
        .iter()
        .map(|term| {
            let value = quote(term);
            TERM_FIELDS
                .iter()
                .map(|field| format!("({} CONTAINS {})", field, value))
                .collect::<Vec<_>>()
                .join(" OR ")
        })
        .collect();
    Some(format!("({})", groups.join(" OR ")))
}

/// AND together every non-empty expression, parenthesising each piece.
pub fn combine_filters<I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let parts: Vec<String> = parts
        .into_iter()
        .flatten()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(
            parts
                .iter()
                .map(|p| format!("({})", p))
                .collect::<Vec<_>>()
                .join(" AND "),
        ),
    }
}

/// Double-quote a filter value, escaping backslashes and quotes.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_term_expression() {
        let expr = build_filter_expression(&["shoghi".to_string()]);
        assert_eq!(
            expr.as_deref(),
            Some(r#"((author CONTAINS "shoghi") OR (collection CONTAINS "shoghi") OR (title CONTAINS "shoghi"))"#)
        );
    }

    #[test]
    fn test_multiple_terms_or_joined_in_one_group() {
        let expr = build_filter_expression(&["a".to_string(), "b".to_string()])
            .expect("expression");
        assert!(expr.starts_with("((author CONTAINS \"a\")"));
        assert!(expr.contains("(title CONTAINS \"a\") OR (author CONTAINS \"b\")"));
        assert!(expr.ends_with("(title CONTAINS \"b\"))"));
        assert!(!expr.contains(" AND "));
    }

    #[test]
    fn test_no_terms_no_expression() {
        assert_eq!(build_filter_expression(&[]), None);
    }

    #[test]
    fn test_quotes_escaped() {
        let expr = build_filter_expression(&["say \"hi\"".to_string()]).expect("expression");
        assert!(expr.contains(r#"(author CONTAINS "say \"hi\"")"#));
    }

    #[test]
    fn test_scope_expression() {
        let scope = ScopeFilter {
            religion: Some("Baha'i".into()),
            collection: Some("  ".into()),
            author: Some("Shoghi Effendi".into()),
        };
        assert_eq!(
            scope.expression().as_deref(),
            Some(r#"religion = "Baha'i" AND author = "Shoghi Effendi""#)
        );
        assert_eq!(ScopeFilter::default().expression(), None);
    }

    #[test]
    fn test_combine_filters() {
        assert_eq!(combine_filters(vec![None, None]), None);
        assert_eq!(
            combine_filters(vec![Some("a = 1".into()), None]).as_deref(),
            Some("a = 1")
        );
        assert_eq!(
            combine_filters(vec![Some("a = 1".into()), Some(" ".into()), Some("b = 2".into())]).as_deref(),
            Some("(a = 1) AND (b = 2)")
        );
    }
}
