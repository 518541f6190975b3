use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const MAX_EMAILS: usize = 2;
const MAX_PHONES: usize = 2;

/// Fixed skill vocabulary, matched case-insensitively as substrings.
pub const TECH_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "Ruby",
    "Rails",
    "React",
    "Node.js",
    "SQL",
    "HTML",
    "CSS",
    "Git",
    "AWS",
    "Azure",
    "Docker",
    "Kubernetes",
    "Machine Learning",
    "AI",
    "Data Science",
    "Project Management",
];

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("Invalid email regex")
});

// Optional +1 country code, optional parens around the area code,
// '-', '.' or whitespace separators. The number itself is capture group 1 and
// may not start inside a longer run of letters or digits.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[^0-9A-Za-z])((?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4})\b",
    )
    .expect("Invalid phone regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicContactInfo {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

/// Result of the regex-only scan over resume text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasicInfo {
    pub contact_info: BasicContactInfo,
    pub skills: Vec<String>,
    pub text_length: usize,
}

pub fn extract_basic_info(text: &str) -> BasicInfo {
    let emails = EMAIL_PATTERN
        .find_iter(text)
        .take(MAX_EMAILS)
        .map(|m| m.as_str().to_string())
        .collect();

    let phones = PHONE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .take(MAX_PHONES)
        .map(|m| m.as_str().trim().to_string())
        .collect();

    let text_lower = text.to_lowercase();
    let skills = TECH_SKILLS
        .iter()
        .filter(|skill| text_lower.contains(&skill.to_lowercase()))
        .map(|skill| skill.to_string())
        .collect();

    BasicInfo {
        contact_info: BasicContactInfo { emails, phones },
        skills,
        text_length: text.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emails_capped_at_two() {
        let info = extract_basic_info("a@x.com, b@y.org and c@z.net");
        assert_eq!(info.contact_info.emails, vec!["a@x.com", "b@y.org"]);
    }

    #[test]
    fn test_phone_formats() {
        let info = extract_basic_info("Call (555) 123-4567 or +1 555.987.6543");
        assert_eq!(info.contact_info.phones.len(), 2);
        assert!(info.contact_info.phones[0].contains("123-4567"));
        assert!(info.contact_info.phones[1].starts_with("+1"));
    }

    #[test]
    fn test_plain_dashed_phone() {
        let info = extract_basic_info("John Doe, john@x.com, 555-123-4567, Python developer");
        assert_eq!(info.contact_info.phones, vec!["555-123-4567"]);
        assert_eq!(info.contact_info.emails, vec!["john@x.com"]);
    }

    #[test]
    fn test_unseparated_phone_with_country_code() {
        let info = extract_basic_info("Phone: +15551234567");
        assert_eq!(info.contact_info.phones, vec!["+15551234567"]);

        let info = extract_basic_info("Phone: 15551234567");
        assert_eq!(info.contact_info.phones, vec!["15551234567"]);
    }

    #[test]
    fn test_digits_inside_longer_numbers_are_not_phones() {
        let info = extract_basic_info("Order 905551234567890 shipped");
        assert!(info.contact_info.phones.is_empty());
    }

    #[test]
    fn test_skills_match_case_insensitively() {
        let info = extract_basic_info("experienced with DOCKER, kubernetes and node.js");
        assert!(info.skills.contains(&"Docker".to_string()));
        assert!(info.skills.contains(&"Kubernetes".to_string()));
        assert!(info.skills.contains(&"Node.js".to_string()));
        assert!(!info.skills.contains(&"Ruby".to_string()));
    }

    #[test]
    fn test_text_length_counts_chars() {
        assert_eq!(extract_basic_info("héllo").text_length, 5);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let info = extract_basic_info("");
        assert!(info.contact_info.emails.is_empty());
        assert!(info.contact_info.phones.is_empty());
        assert!(info.skills.is_empty());
    }
}
