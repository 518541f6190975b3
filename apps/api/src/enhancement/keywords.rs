use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from", "up",
    "about", "into", "through", "during", "before", "after", "above", "below", "between",
    "among", "down", "out", "off", "over", "under", "again", "further", "then", "once", "here",
    "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more", "most",
    "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "can", "will", "just", "should",
];

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z][a-z0-9]*\b").expect("Invalid word regex"));

/// Keywords in order of first appearance, without duplicates.
pub fn keyword_sequence(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut seen = HashSet::new();
    WORD_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS && !STOP_WORDS.contains(word))
        .filter(|word| seen.insert(*word))
        .map(String::from)
        .collect()
}

pub fn extract_keywords(text: &str) -> HashSet<String> {
    keyword_sequence(text).into_iter().collect()
}

/// Percentage of job-description keywords that also occur in the resume,
/// rounded to two decimals. Zero without a job description or when it has
/// no keywords at all.
pub fn calculate_match_score(resume_text: &str, job_description: Option<&str>) -> f64 {
    let Some(job_description) = job_description else {
        return 0.0;
    };

    let jd_keywords = extract_keywords(job_description);
    if jd_keywords.is_empty() {
        return 0.0;
    }
    let resume_keywords = extract_keywords(resume_text);

    let matches = jd_keywords.intersection(&resume_keywords).count();
    let score = matches as f64 / jd_keywords.len() as f64 * 100.0;
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_and_short_tokens_dropped() {
        let keywords = extract_keywords("The team of Go and Rust engineers should ship it");
        assert!(keywords.contains("team"));
        assert!(keywords.contains("rust"));
        assert!(keywords.contains("engineers"));
        assert!(keywords.contains("ship"));
        assert!(!keywords.contains("the"));
        assert!(!keywords.contains("should"));
        assert!(!keywords.contains("go"));
        assert!(!keywords.contains("it"));
        for word in &keywords {
            assert!(word.chars().count() >= MIN_KEYWORD_CHARS);
            assert!(!STOP_WORDS.contains(&word.as_str()));
        }
    }

    #[test]
    fn test_tokens_must_start_with_a_letter() {
        let keywords = extract_keywords("5years k8s 2024 python3");
        assert!(keywords.contains("k8s"));
        assert!(keywords.contains("python3"));
        assert!(!keywords.iter().any(|k| k.starts_with(|c: char| c.is_ascii_digit())));
    }

    #[test]
    fn test_extraction_is_idempotent_and_case_insensitive() {
        let text = "Kubernetes kubernetes KUBERNETES Docker";
        assert_eq!(extract_keywords(text), extract_keywords(text));
        assert_eq!(extract_keywords(text).len(), 2);
    }

    #[test]
    fn test_sequence_preserves_first_appearance() {
        assert_eq!(
            keyword_sequence("Terraform, AWS, terraform, Python"),
            vec!["terraform", "aws", "python"]
        );
    }

    #[test]
    fn test_match_score_without_jd_is_zero() {
        assert_eq!(calculate_match_score("python developer", None), 0.0);
    }

    #[test]
    fn test_match_score_full_coverage_is_100() {
        let jd = "Python developer with Docker";
        let resume = "Senior python developer. Uses docker daily.";
        assert_eq!(calculate_match_score(resume, Some(jd)), 100.0);
    }

    #[test]
    fn test_match_score_partial_and_rounded() {
        // jd keywords: python, kafka, terraform -> 1 of 3
        let score = calculate_match_score("python", Some("python kafka terraform"));
        assert_eq!(score, 33.33);
    }

    #[test]
    fn test_match_score_jd_without_keywords() {
        assert_eq!(calculate_match_score("anything", Some("to be or not")), 0.0);
    }

    #[test]
    fn test_match_score_in_range() {
        let score = calculate_match_score("", Some("rust systems programming"));
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(score, 0.0);
    }
}
