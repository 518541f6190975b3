use serde::Serialize;

use crate::providers::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementMethod {
    AiSuggestions,
    BasicSuggestions,
}

/// Suggestions for one resume. `enhanced_content` is the input text; no
/// path rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementResult {
    pub enhanced_content: String,
    pub suggestions: Vec<String>,
    /// Keyword overlap with the job description, 0..=100.
    pub match_score: f64,
    pub provider_used: Provider,
    pub enhancement_method: EnhancementMethod,
    /// Local model that produced the suggestions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Raw model reply the suggestions were taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<String>,
}
