//! Regex/keyword structuring. Depends only on the input text, so it cannot
//! fail; it is both the `basic` provider and the fallback for every AI path.

use crate::extraction::DocumentTextExtractor;
use crate::providers::Provider;
use crate::structuring::models::{
    ContactInfo, Education, ExtractionMethod, ResumeFields, StructuredResume, WorkExperience,
};
use crate::text::truncate_chars;

const EDUCATION_KEYWORDS: &[&str] = &["university", "college", "bachelor", "master", "phd", "degree"];
const ROLE_KEYWORDS: &[&str] = &["manager", "developer", "engineer", "analyst", "director", "lead"];
const MAX_EDUCATION: usize = 3;
const MAX_EXPERIENCE: usize = 5;
const SUMMARY_CHARS: usize = 300;

pub fn structure_basic(text: &str) -> StructuredResume {
    let info = DocumentTextExtractor.extract_basic_info(text);
    let emails = info.contact_info.emails;
    let phones = info.contact_info.phones;

    let mut fields = ResumeFields {
        contact_info: ContactInfo {
            email: emails.first().cloned(),
            phone: phones.first().cloned(),
            emails,
            phones,
            ..Default::default()
        },
        summary: Some(summarize(text)),
        experience: extract_experience(text),
        education: extract_education(text),
        skills: info.skills,
        certifications: Vec::new(),
    };
    fields.dedup_skills();

    StructuredResume {
        fields,
        provider_used: Provider::Basic,
        extraction_method: ExtractionMethod::BasicRegex,
        ai_response: None,
    }
}

fn summarize(text: &str) -> String {
    let head = truncate_chars(text, SUMMARY_CHARS);
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

/// Lines that contain any of `keywords`, case-insensitively, trimmed.
fn matching_lines<'a>(text: &'a str, keywords: &'a [&str]) -> impl Iterator<Item = &'a str> {
    text.lines().map(str::trim).filter(move |line| {
        let lower = line.to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    })
}

fn extract_education(text: &str) -> Vec<Education> {
    matching_lines(text, EDUCATION_KEYWORDS)
        .take(MAX_EDUCATION)
        .map(|line| Education {
            institution: Some(line.to_string()),
            ..Default::default()
        })
        .collect()
}

fn extract_experience(text: &str) -> Vec<WorkExperience> {
    matching_lines(text, ROLE_KEYWORDS)
        .take(MAX_EXPERIENCE)
        .map(|line| WorkExperience {
            position: Some(line.to_string()),
            description: Some(line.to_string()),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "John Doe\n\
        john@x.com | 555-123-4567\n\
        Senior Developer, Acme Corp\n\
        Engineering Manager, Globex\n\
        B.Sc. Computer Science, State University\n\
        Skills: Python, Docker, SQL";

    #[test]
    fn test_contact_info_from_regex_scan() {
        let resume = structure_basic(RESUME);
        let contact = &resume.fields.contact_info;
        assert_eq!(contact.emails, vec!["john@x.com"]);
        assert_eq!(contact.email.as_deref(), Some("john@x.com"));
        assert_eq!(contact.phones, vec!["555-123-4567"]);
        assert_eq!(contact.name, None);
    }

    #[test]
    fn test_experience_and_education_lines() {
        let resume = structure_basic(RESUME);
        let positions: Vec<_> = resume
            .fields
            .experience
            .iter()
            .filter_map(|e| e.position.as_deref())
            .collect();
        assert_eq!(
            positions,
            vec!["Senior Developer, Acme Corp", "Engineering Manager, Globex"]
        );
        assert_eq!(resume.fields.education.len(), 1);
        assert_eq!(
            resume.fields.education[0].institution.as_deref(),
            Some("B.Sc. Computer Science, State University")
        );
    }

    #[test]
    fn test_caps_on_entries() {
        let text = (0..10)
            .map(|i| format!("Lead engineer at University spinout {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let resume = structure_basic(&text);
        assert_eq!(resume.fields.experience.len(), MAX_EXPERIENCE);
        assert_eq!(resume.fields.education.len(), MAX_EDUCATION);
    }

    #[test]
    fn test_summary_truncated_with_ellipsis() {
        let long = "x".repeat(450);
        let resume = structure_basic(&long);
        let summary = resume.fields.summary.unwrap();
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));

        let short = structure_basic("short resume");
        assert_eq!(short.fields.summary.as_deref(), Some("short resume"));
    }

    #[test]
    fn test_marks_basic_provider() {
        let resume = structure_basic(RESUME);
        assert_eq!(resume.provider_used, Provider::Basic);
        assert_eq!(resume.extraction_method, ExtractionMethod::BasicRegex);
        assert!(resume.fields.skills.contains(&"Python".to_string()));
        assert!(resume.fields.certifications.is_empty());
    }
}
