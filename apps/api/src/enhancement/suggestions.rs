//! Pulls actionable suggestions out of free-form model output.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_SUGGESTIONS: usize = 7;

const SUGGESTION_MARKERS: &[&str] = &["suggest", "recommend", "consider", "improve"];
const MIN_MARKED_CHARS: usize = 20;
const MIN_LISTED_CHARS: usize = 15;
const FALLBACK_SENTENCES: usize = 3;
const MIN_SENTENCE_CHARS: usize = 20;

static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("Invalid numbered list regex"));

fn strip_list_marker(line: &str) -> &str {
    line.trim_start_matches(|c: char| matches!(c, '•' | '-' | '*' | '.' | ' ' | '1'..='9'))
}

fn is_list_item(line: &str) -> bool {
    line.starts_with(['•', '-', '*']) || NUMBERED_ITEM.is_match(line)
}

/// Lines mentioning a suggestion keyword are kept when longer than 20
/// characters; other bullet or numbered lines when longer than 15. Without
/// any, the first three sentences over 20 characters are used.
pub fn extract_suggestions(text: &str) -> Vec<String> {
    let mut suggestions = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();

        if SUGGESTION_MARKERS.iter().any(|m| lower.contains(m)) {
            let cleaned = strip_list_marker(line);
            if cleaned.chars().count() > MIN_MARKED_CHARS {
                suggestions.push(cleaned.to_string());
            }
        } else if is_list_item(line) {
            let cleaned = strip_list_marker(line);
            if cleaned.chars().count() > MIN_LISTED_CHARS {
                suggestions.push(cleaned.to_string());
            }
        }
    }

    if suggestions.is_empty() {
        suggestions = text
            .split(". ")
            .take(FALLBACK_SENTENCES)
            .map(str::trim)
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .map(|s| {
                if s.ends_with('.') {
                    s.to_string()
                } else {
                    format!("{s}.")
                }
            })
            .collect();
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
