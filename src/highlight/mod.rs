/// Sentence highlighting inside retrieved paragraphs.
///
/// An LLM proposes start/end anchors; `find_sentence` resolves them against the
/// paragraph with fuzzy matching. Unresolvable anchors are an ordinary outcome
/// and produce `None`, leaving the paragraph unhighlighted.

pub mod anchor;
pub mod provider;
pub mod sentence;

pub use anchor::{find_anchor, normalize_for_match, AnchorMatch};
pub use provider::{AnchorError, AnchorProvider, OpenAIAnchorProvider, SentenceAnchors};
pub use sentence::{find_sentence, SentenceSpan, MAX_SPAN_CHARS};

/// Ask `provider` for anchors and resolve them in `paragraph`.
///
/// Provider failures are returned as errors; anchors that do not resolve give `Ok(None)`.
pub async fn highlight_passage(
    provider: &dyn AnchorProvider,
    query: &str,
    paragraph: &str,
) -> Result<Option<SentenceSpan>, AnchorError> {
    let Some(anchors) = provider.anchors(query, paragraph).await? else {
        return Ok(None);
    };
    let span = find_sentence(paragraph, &anchors.start, &anchors.end);
    if span.is_none() {
        tracing::debug!(
            model = provider.model_name(),
            start = %anchors.start,
            end = %anchors.end,
            "Anchors did not resolve in paragraph"
        );
    }
    Ok(span)
}

/// Wrap `span` in `<mark>` tags. Returns the text unchanged if the span does not fit it.
pub fn mark_span(text: &str, span: &SentenceSpan) -> String {
    match (text.get(..span.start), text.get(span.start..span.end), text.get(span.end..)) {
        (Some(before), Some(marked), Some(after)) => {
            format!("{}<mark>{}</mark>{}", before, marked, after)
        }
        _ => text.to_string(),
    }
}
