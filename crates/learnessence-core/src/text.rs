//! Plain-text heuristics used when no generation backend is configured,
//! plus the title helpers shared by the generation routes.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults;
use crate::models::NewFlashcard;

static SENTENCE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("valid sentence regex"));

/// Split text into sentences at whitespace that follows `.`, `!` or `?`.
///
/// Sentences are trimmed and empty pieces dropped. Text without terminal
/// punctuation comes back as a single sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(&text[start..idx]);
            // Swallow the rest of the whitespace run.
            let mut end = idx + ch.len_utf8();
            while let Some(&(next_idx, next)) = iter.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_idx + next.len_utf8();
                iter.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Keep at most `max` characters, appending `...` when cut.
pub fn truncate_with_ellipsis(s: &str, max: usize, keep: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(keep).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

/// One card per sentence: the (possibly truncated) sentence on the front,
/// the full sentence on the back.
pub fn naive_flashcards(text: &str) -> Vec<NewFlashcard> {
    split_sentences(text)
        .into_iter()
        .take(defaults::MAX_FLASHCARDS_PER_SET)
        .map(|sentence| NewFlashcard {
            front: truncate_with_ellipsis(
                &sentence,
                defaults::FLASHCARD_FRONT_MAX_CHARS,
                defaults::FLASHCARD_FRONT_KEEP_CHARS,
            ),
            back: sentence,
        })
        .collect()
}

/// First three sentences, or the first 400 characters when the text has
/// fewer than three terminated sentences.
pub fn naive_summary(text: &str) -> String {
    let runs: Vec<&str> = SENTENCE_RUN.find_iter(text).map(|m| m.as_str()).collect();
    if runs.len() >= defaults::NAIVE_SUMMARY_SENTENCES {
        return runs[..defaults::NAIVE_SUMMARY_SENTENCES]
            .join(" ")
            .trim()
            .to_string();
    }
    text.chars()
        .take(defaults::NAIVE_SUMMARY_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// `"{prefix} - M/D/YYYY"`, e.g. `Voice Note - 3/7/2026`.
pub fn default_title(prefix: &str, date: NaiveDate) -> String {
    format!(
        "{} - {}/{}/{}",
        prefix,
        date.month(),
        date.day(),
        date.year()
    )
}

/// Title for a note created implicitly from raw text.
pub fn title_from_text(text: &str) -> String {
    let title: String = text.chars().take(defaults::AUTO_TITLE_CHARS).collect();
    if title.is_empty() {
        defaults::UNTITLED_NOTE.to_string()
    } else {
        title
    }
}
