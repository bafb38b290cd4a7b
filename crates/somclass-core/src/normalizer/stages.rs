//! Individual normalization stages.
//!
//! Every stage is a pure `&str -> String` function. They are applied in the
//! order they appear in this file.

use std::collections::HashSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::policy::{CharacterPolicy, COLLAPSIBLE_PUNCTUATION};

/// Longest chunk, in words, considered by [`collapse_repeated_phrases`].
pub const MAX_PHRASE_WORDS: usize = 16;

/// Applies NFKD and drops combining marks, leaving base letters.
pub fn strip_diacritics(text: &str) -> String {
    text.nfkd().filter(|&c| !is_combining_mark(c)).collect()
}

/// Unicode lowercase.
pub fn lowercase(text: &str) -> String {
    text.to_lowercase()
}

/// Drops every character outside the policy.
///
/// Whitespace is mapped to a plain space first so that line breaks keep
/// separating words.
pub fn filter_characters(text: &str, policy: &CharacterPolicy) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|&c| policy.allows(c))
        .collect()
}

/// Collapses whitespace runs to one space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses runs of the same punctuation mark (`, . ! ? ( ) -`).
pub fn collapse_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if prev == Some(c) && COLLAPSIBLE_PUNCTUATION.contains(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Shrinks a word repeated three or more times in a row to two occurrences.
///
/// Words are space-separated tokens, so `"heeee! heeee! heeee!"` becomes
/// `"heeee! heeee!"`.
pub fn collapse_repeated_words(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut run = 0usize;
    for word in text.split(' ') {
        if out.last() == Some(&word) {
            run += 1;
        } else {
            run = 1;
        }
        if run <= 2 {
            out.push(word);
        }
    }
    out.join(" ")
}

/// Shrinks a multi-word chunk repeated three or more times in a row to a
/// single occurrence. The shortest repeating chunk wins.
///
/// Chunks are at most [`MAX_PHRASE_WORDS`] long, which keeps the scan linear
/// in the word count.
pub fn collapse_repeated_phrases(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    let n = words.len();
    let mut out: Vec<&str> = Vec::with_capacity(n);
    let mut i = 0;

    while i < n {
        let mut skip = None;
        for len in 2..=((n - i) / 3).min(MAX_PHRASE_WORDS) {
            let chunk = &words[i..i + len];
            let mut reps = 1;
            while i + (reps + 1) * len <= n
                && &words[i + reps * len..i + (reps + 1) * len] == chunk
            {
                reps += 1;
            }
            if reps >= 3 {
                out.extend_from_slice(chunk);
                skip = Some(reps * len);
                break;
            }
        }
        match skip {
            Some(consumed) => i += consumed,
            None => {
                out.push(words[i]);
                i += 1;
            }
        }
    }

    out.join(" ")
}

/// Splits into sentences and keeps the first occurrence of each.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace, or at a line
/// break. Segments are trimmed before comparison and rejoined with spaces.
pub fn dedupe_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();

    for segment in split_sentences(text) {
        let segment = segment.trim();
        if !segment.is_empty() && seen.insert(segment) {
            kept.push(segment);
        }
    }

    kept.join(" ")
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let boundary = match c {
            '\n' | '\r' => Some(idx),
            '.' | '!' | '?' => match chars.peek() {
                Some(&(next_idx, next)) if next.is_whitespace() => Some(next_idx),
                _ => None,
            },
            _ => None,
        };
        if let Some(end) = boundary {
            segments.push(&text[start..end]);
            start = end;
        }
    }
    segments.push(&text[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_diacritics_keeps_base_letters() {
        assert_eq!(strip_diacritics("Café naïve"), "Cafe naive");
        // Compatibility forms are decomposed too
        assert_eq!(strip_diacritics("ﬁ"), "fi");
    }

    #[test]
    fn filter_drops_foreign_characters() {
        let policy = CharacterPolicy::somali();
        assert_eq!(filter_characters("waa; p@z", policy), "waa ");
        assert_eq!(filter_characters("haa\nmaya", policy), "haa maya");
    }

    #[test]
    fn collapse_whitespace_trims() {
        assert_eq!(collapse_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn collapse_punctuation_runs() {
        assert_eq!(collapse_punctuation("haa!!! maya??"), "haa! maya?");
        assert_eq!(collapse_punctuation("(( --"), "( -");
        // Mixed runs stay, apostrophes are not collapsed
        assert_eq!(collapse_punctuation("?! ''"), "?! ''");
    }

    #[test]
    fn repeated_word_collapses_to_two() {
        assert_eq!(collapse_repeated_words("haa haa haa haa"), "haa haa");
        assert_eq!(collapse_repeated_words("haa haa maya"), "haa haa maya");
        assert_eq!(
            collapse_repeated_words("a b b b c c c c d"),
            "a b b c c d"
        );
    }

    #[test]
    fn repeated_word_with_punctuation() {
        let text = "heeee!!!   heeee!!!   heeee!!!";
        let text = collapse_punctuation(&collapse_whitespace(text));
        assert_eq!(collapse_repeated_words(&text), "heeee! heeee!");
    }

    #[test]
    fn repeated_phrase_collapses_to_one() {
        assert_eq!(
            collapse_repeated_phrases("waa run waa run waa run dhab"),
            "waa run dhab"
        );
        // Two repetitions are kept
        assert_eq!(collapse_repeated_phrases("waa run waa run"), "waa run waa run");
        assert_eq!(
            collapse_repeated_phrases("x a b c a b c a b c y"),
            "x a b c y"
        );
    }

    #[test]
    fn repeated_phrase_longer_than_cap_is_kept() {
        let chunk: Vec<String> = (0..MAX_PHRASE_WORDS + 1).map(|i| format!("w{}", i)).collect();
        let chunk = chunk.join(" ");
        let text = [chunk.as_str(); 3].join(" ");
        assert_eq!(collapse_repeated_phrases(&text), text);
    }

    #[test]
    fn repeated_phrase_scan_is_linear_on_long_text() {
        let text: Vec<String> = (0..50_000).map(|i| format!("erey{}", i)).collect();
        let text = text.join(" ");

        let start = std::time::Instant::now();
        let out = collapse_repeated_phrases(&text);
        assert_eq!(out, text);
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        assert_eq!(
            dedupe_sentences("Waa wanaagsan. Waa wanaagsan."),
            "Waa wanaagsan."
        );
        assert_eq!(dedupe_sentences("a. b! a. c? b!"), "a. b! c?");
    }

    #[test]
    fn dedupe_splits_on_line_breaks() {
        assert_eq!(dedupe_sentences("haa\nhaa\n\nmaya"), "haa maya");
    }

    #[test]
    fn dedupe_needs_whitespace_after_punctuation() {
        assert_eq!(dedupe_sentences("3.5 3.5"), "3.5 3.5");
    }
}
