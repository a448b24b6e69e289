/// Sentence location from a pair of start/end anchors.

use serde::{Deserialize, Serialize};

use super::anchor::find_anchor;

/// Longest span (in characters) accepted as a single highlighted sentence.
/// Longer spans mean the anchors latched onto unrelated text.
pub const MAX_SPAN_CHARS: usize = 800;

/// A located span: byte offsets into the source plus the extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Find the span beginning at `start_anchor` and ending at the first
/// `end_anchor` that follows it.
///
/// Returns `None` when either anchor is blank or unmatched, or when the span
/// exceeds `MAX_SPAN_CHARS`.
pub fn find_sentence(text: &str, start_anchor: &str, end_anchor: &str) -> Option<SentenceSpan> {
    if start_anchor.trim().is_empty() || end_anchor.trim().is_empty() {
        return None;
    }

    let start = find_anchor(text, start_anchor, 0)?;
    let end = find_anchor(text, end_anchor, start.end)?;

    let span = text.get(start.start..end.end)?;
    if span.chars().count() > MAX_SPAN_CHARS {
        tracing::debug!(
            chars = span.chars().count(),
            "Anchored span too long, treating as no match"
        );
        return None;
    }

    Some(SentenceSpan {
        start: start.start,
        end: end.end,
        text: span.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH: &str =
        "Prayer is important. The soul is immortal and everlasting. Love is divine.";

    #[test]
    fn test_find_sentence() {
        let span = find_sentence(PARAGRAPH, "The soul is", "and everlasting").expect("span");
        assert_eq!(span.text, "The soul is immortal and everlasting");
        assert_eq!(&PARAGRAPH[span.start..span.end], span.text);
        assert!(span.end > span.start);
    }

    #[test]
    fn test_end_anchor_must_follow_start() {
        // "Prayer is" only occurs before the start anchor
        assert!(find_sentence(PARAGRAPH, "Love is", "Prayer is").is_none());
    }

    #[test]
    fn test_end_anchor_searched_after_start_match() {
        let text = "is divine. Love is divine. The end.";
        let span = find_sentence(text, "Love", "is divine").expect("span");
        assert_eq!(span.text, "Love is divine");
    }

    #[test]
    fn test_blank_anchors() {
        assert!(find_sentence(PARAGRAPH, "", "everlasting").is_none());
        assert!(find_sentence(PARAGRAPH, "The soul", "   ").is_none());
    }

    #[test]
    fn test_unmatched_anchor() {
        assert!(find_sentence(PARAGRAPH, "The spirit is", "everlasting").is_none());
        assert!(find_sentence(PARAGRAPH, "The soul is", "forever and ever").is_none());
    }

    #[test]
    fn test_span_cap() {
        let filler = "word ".repeat(200);
        let long = format!("Begin here. {}finish now.", filler);
        assert!(find_sentence(&long, "Begin here", "finish now").is_none());

        let short = format!("Begin here. {}finish now.", "word ".repeat(100));
        let span = find_sentence(&short, "Begin here", "finish now").expect("span under cap");
        assert!(span.text.chars().count() <= MAX_SPAN_CHARS);
    }

    #[test]
    fn test_span_exactly_at_cap_accepted() {
        // "a " + 796 x's + " b" = 800 chars
        let text = format!("a {} b", "x".repeat(796));
        let span = find_sentence(&text, "a", "b").expect("span at cap");
        assert_eq!(span.text.chars().count(), 800);
    }

    #[test]
    fn test_find_sentence_is_idempotent() {
        let a = find_sentence(PARAGRAPH, "The soul is", "and everlasting");
        let b = find_sentence(PARAGRAPH, "The soul is", "and everlasting");
        assert_eq!(a, b);
    }
}
