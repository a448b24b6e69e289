/// Fuzzy anchor matching over untrusted (LLM-supplied) phrases.
///
/// An anchor matches when its words appear in order in the source text,
/// compared case-insensitively, with any run of non-word characters between
/// words ignored. Punctuation inside a source word (apostrophes, hyphens) is
/// skipped as well, mirroring how `normalize_for_match` strips it from the
/// anchor. Offsets always refer to the original, unnormalized text.
///
/// Matching is an explicit scan: each occurrence of the first anchor word at or
/// after `search_from` is a candidate, even inside a longer word; a failed
/// attempt moves on to the next character. Worst case is O(text_len * anchor_len).

use serde::{Deserialize, Serialize};

/// Byte offsets of a matched anchor in the original text (`start..end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorMatch {
    pub start: usize,
    pub end: usize,
}

/// Word characters: Unicode letters and digits plus underscore.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lowercase, drop non-word non-space characters, collapse whitespace, trim.
pub fn normalize_for_match(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else if is_word_char(c) {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// Locate `anchor` in `text` at or after byte offset `search_from`.
///
/// Returns `None` when the anchor has no words after normalization or when no
/// position matches before the end of the text.
pub fn find_anchor(text: &str, anchor: &str, search_from: usize) -> Option<AnchorMatch> {
    let normalized = normalize_for_match(anchor);
    let words: Vec<Vec<char>> = normalized
        .split_whitespace()
        .map(|w| w.chars().collect())
        .collect();
    if words.is_empty() {
        return None;
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut cursor = chars.partition_point(|(offset, _)| *offset < search_from);

    while cursor < chars.len() {
        if let Some(end_idx) = match_words(&chars, cursor, &words) {
            let start = chars[cursor].0;
            let end = chars.get(end_idx).map(|(offset, _)| *offset).unwrap_or(text.len());
            return Some(AnchorMatch { start, end });
        }
        cursor += 1;
    }
    None
}

/// Match every anchor word in sequence from `start`; returns the char index
/// just past the last matched word.
fn match_words(chars: &[(usize, char)], start: usize, words: &[Vec<char>]) -> Option<usize> {
    let (first, rest) = words.split_first()?;
    let mut pos = match_word(chars, start, first)?;
    for word in rest {
        while pos < chars.len() && !is_word_char(chars[pos].1) {
            pos += 1;
        }
        pos = match_word(chars, pos, word)?;
    }
    Some(pos)
}

/// Consume one source word at `start` and compare it to `word` (already
/// lowercased). The source word must end where the anchor word ends.
fn match_word(chars: &[(usize, char)], start: usize, word: &[char]) -> Option<usize> {
    let mut pos = start;
    let mut k = 0;
    while k < word.len() {
        let (_, c) = *chars.get(pos)?;
        if is_word_char(c) {
            for lc in c.to_lowercase() {
                if word.get(k) != Some(&lc) {
                    return None;
                }
                k += 1;
            }
            pos += 1;
        } else if pos > start && !c.is_whitespace() && next_is_word(chars, pos) {
            // in-word punctuation: Bahá'u'lláh, self-sacrifice
            pos += 1;
        } else {
            return None;
        }
    }
    if chars.get(pos).is_some_and(|(_, c)| is_word_char(*c)) {
        return None;
    }
    Some(pos)
}

fn next_is_word(chars: &[(usize, char)], pos: usize) -> bool {
    chars.get(pos + 1).is_some_and(|(_, c)| is_word_char(*c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice<'a>(text: &'a str, m: &AnchorMatch) -> &'a str {
        &text[m.start..m.end]
    }

    #[test]
    fn test_normalize_for_match() {
        assert_eq!(normalize_for_match("  The Soul,  is\tIMMORTAL! "), "the soul is immortal");
        assert_eq!(normalize_for_match("Bahá'u'lláh"), "baháulláh");
        assert_eq!(normalize_for_match("a , b"), "a b");
        assert_eq!(normalize_for_match("?!..."), "");
    }

    #[test]
    fn test_exact_match() {
        let text = "Prayer is important. The soul is immortal.";
        let m = find_anchor(text, "The soul is", 0).expect("match");
        assert_eq!(slice(text, &m), "The soul is");
        assert_eq!(m.start, 21);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let text = "Verily, the soul, is immortal; and everlasting.";
        let m = find_anchor(text, "the soul is immortal and", 0).expect("match");
        assert_eq!(slice(text, &m), "the soul, is immortal; and");

        let m = find_anchor(text, "VERILY THE SOUL", 0).expect("match");
        assert_eq!(slice(text, &m), "Verily, the soul");
    }

    #[test]
    fn test_anchor_punctuation_ignored() {
        let text = "O Son of Being Love Me that I may love thee";
        let m = find_anchor(text, "O Son of Being! Love Me,", 0).expect("match");
        assert_eq!(slice(text, &m), "O Son of Being Love Me");
    }

    #[test]
    fn test_inner_word_punctuation() {
        let text = "Revealed by Bahá'u'lláh in Baghdad.";
        let m = find_anchor(text, "by Baháulláh in", 0).expect("match");
        assert_eq!(slice(text, &m), "by Bahá'u'lláh in");
        let m = find_anchor(text, "by Bahá'u'lláh", 0).expect("match");
        assert_eq!(slice(text, &m), "by Bahá'u'lláh");
    }

    #[test]
    fn test_retry_after_partial_match() {
        // First "the soul" is followed by "was", second by "is"
        let text = "the soul was. then the soul is free";
        let m = find_anchor(text, "the soul is", 0).expect("match");
        assert_eq!(slice(text, &m), "the soul is");
        assert_eq!(m.start, 19);
    }

    #[test]
    fn test_word_must_match_whole_source_word() {
        let text = "immortality and the immortal soul";
        let m = find_anchor(text, "immortal", 0).expect("match");
        assert_eq!(m.start, 20);
        assert_eq!(slice(text, &m), "immortal");
        // Each anchor word must end where the source word ends
        assert!(find_anchor("the souls", "the soul", 0).is_none());
    }

    #[test]
    fn test_first_word_may_start_inside_source_word() {
        let text = "bathe soul";
        let m = find_anchor(text, "the soul", 0).expect("match");
        assert_eq!(m, AnchorMatch { start: 2, end: 10 });
        assert_eq!(slice(text, &m), "the soul");
    }

    #[test]
    fn test_search_from_respected() {
        let text = "love is divine. love is eternal.";
        let m = find_anchor(text, "love is", 1).expect("match");
        assert_eq!(m.start, 16);
        assert!(find_anchor(text, "love is divine", 1).is_none());
        assert!(find_anchor(text, "love", text.len()).is_none());
    }

    #[test]
    fn test_not_found() {
        assert!(find_anchor("some text here", "absent phrase", 0).is_none());
        assert!(find_anchor("some text here", "", 0).is_none());
        assert!(find_anchor("some text here", " ,;! ", 0).is_none());
        assert!(find_anchor("", "text", 0).is_none());
    }

    #[test]
    fn test_anchor_at_end_of_text() {
        let text = "Love is divine";
        let m = find_anchor(text, "is divine", 0).expect("match");
        assert_eq!(m.end, text.len());
        assert_eq!(slice(text, &m), "is divine");
    }

    #[test]
    fn test_multibyte_offsets_are_char_boundaries() {
        let text = "Él dijo: «la paz sea contigo»";
        let m = find_anchor(text, "la paz", 0).expect("match");
        assert_eq!(slice(text, &m), "la paz");
        let m = find_anchor(text, "él dijo", 0).expect("match");
        assert_eq!(slice(text, &m), "Él dijo");
    }
}
