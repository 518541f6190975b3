//! Structured resume schema. Every field is optional or defaultable: model
//! output is partial and loosely typed, so scalars accept numbers and
//! booleans as well as strings, and lists skip entries they cannot read.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::providers::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Model answered with JSON matching the schema.
    AiStructured,
    /// Model answered with prose; kept verbatim under `ai_response`.
    AiTextParsing,
    /// Hosted summariser output merged into a regex extraction.
    AiSummary,
    BasicRegex,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    /// Every address the regex scan found (basic provider only).
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub emails: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient_list")]
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub position: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "lenient_string")]
    pub institution: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub field: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
}

/// The part of a structured resume a model is asked to fill in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeFields {
    #[serde(deserialize_with = "lenient_contact")]
    pub contact_info: ContactInfo,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "lenient_records")]
    pub experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "lenient_records")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "lenient_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub certifications: Vec<String>,
}

impl ResumeFields {
    /// Skills behave as a set: duplicates (ignoring case) are dropped, first
    /// spelling wins.
    pub fn dedup_skills(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.skills.retain(|s| seen.insert(s.to_lowercase()));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredResume {
    #[serde(flatten)]
    pub fields: ResumeFields,
    pub provider_used: Provider,
    pub extraction_method: ExtractionMethod,
    /// Raw model text when it could not be read as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        // "Python, SQL, Docker"
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_contact<'de, D>(deserializer: D) -> Result<ContactInfo, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_object() {
        Ok(serde_json::from_value(value).unwrap_or_default())
    } else {
        Ok(ContactInfo::default())
    }
}
