use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::enhancement::keywords::{calculate_match_score, extract_keywords, keyword_sequence};
use crate::enhancement::models::{EnhancementMethod, EnhancementResult};
use crate::enhancement::prompts::{
    ENHANCE_PROMPT_TEMPLATE, JOB_ALIGNMENT_TEMPLATE, JOB_DESCRIPTION_LIMIT, RESUME_TEXT_LIMIT,
};
use crate::enhancement::suggestions::extract_suggestions;
use crate::providers::{
    GenerationOptions, HostedModelBackend, HostedOutput, HostedTask, LocalModelBackend, Provider,
    ProviderChoice, ProviderError, ProviderStatusChecker,
};
use crate::text::truncate_chars;

const ENHANCE_TEMPERATURE: f32 = 0.3;
const ENHANCE_MAX_TOKENS: u32 = 800;
const LOCAL_TIMEOUT: Duration = Duration::from_secs(120);
const HOSTED_TIMEOUT: Duration = Duration::from_secs(30);

/// Checked in order; the first family with a loaded model wins.
const PREFERRED_MODELS: &[&str] = &["llama3.2", "llama2", "mistral", "phi3", "gemma"];
const MAX_GAP_KEYWORDS: usize = 5;

pub const BASIC_SUGGESTIONS: [&str; 5] = [
    "Use more action verbs (led, managed, developed, implemented)",
    "Add quantifiable achievements with numbers and percentages",
    "Include relevant keywords from the job description",
    "Strengthen your professional summary with specific accomplishments",
    "Highlight technical skills that match the job requirements",
];

/// Produces improvement suggestions and a keyword match score. Same
/// single-hop policy as structuring: any backend failure is answered by the
/// basic generator.
#[derive(Clone)]
pub struct ContentEnhancer {
    status: ProviderStatusChecker,
    local: Arc<dyn LocalModelBackend>,
    hosted: Arc<dyn HostedModelBackend>,
}

impl ContentEnhancer {
    pub fn new(
        status: ProviderStatusChecker,
        local: Arc<dyn LocalModelBackend>,
        hosted: Arc<dyn HostedModelBackend>,
    ) -> Self {
        Self {
            status,
            local,
            hosted,
        }
    }

    pub async fn enhance(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
        choice: ProviderChoice,
        job_id: &str,
    ) -> EnhancementResult {
        let job_description = job_description.filter(|jd| !jd.trim().is_empty());
        let provider = self.status.resolve(choice).await;
        info!(
            "Enhancing resume: job_id={job_id}, provider={provider}, has_job_description={}",
            job_description.is_some()
        );

        let attempt = match provider {
            Provider::Ollama => self.enhance_with_local(resume_text, job_description).await,
            Provider::HuggingFace => self.enhance_with_hosted(resume_text, job_description).await,
            Provider::Basic => return enhance_basic(resume_text, job_description),
        };

        match attempt {
            Ok(result) => result,
            Err(e) => {
                warn!("AI enhancement failed, falling back to basic: job_id={job_id}, provider={provider}, error={e}");
                enhance_basic(resume_text, job_description)
            }
        }
    }

    async fn enhance_with_local(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<EnhancementResult, ProviderError> {
        let models = self.local.list_models().await?;
        let model = select_model(&models).ok_or(ProviderError::NoModels)?;
        info!("Using local model {model}");

        let options = GenerationOptions {
            temperature: ENHANCE_TEMPERATURE,
            max_tokens: ENHANCE_MAX_TOKENS,
            timeout: LOCAL_TIMEOUT,
        };
        let reply = self
            .local
            .generate(model, &build_prompt(resume_text, job_description), options)
            .await?;

        let mut result = ai_result(reply, resume_text, job_description, Provider::Ollama)?;
        result.model_used = Some(model.to_string());
        Ok(result)
    }

    async fn enhance_with_hosted(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<EnhancementResult, ProviderError> {
        if self.hosted.task() == HostedTask::Summarization {
            return Err(ProviderError::SummarizerOnly);
        }
        let options = GenerationOptions {
            temperature: ENHANCE_TEMPERATURE,
            max_tokens: ENHANCE_MAX_TOKENS,
            timeout: HOSTED_TIMEOUT,
        };
        let reply = match self
            .hosted
            .generate(&build_prompt(resume_text, job_description), options)
            .await?
        {
            HostedOutput::Generated(text) | HostedOutput::Summary(text) => text,
        };
        ai_result(reply, resume_text, job_description, Provider::HuggingFace)
    }
}

/// First preferred family present as a substring of a loaded model name,
/// otherwise the first loaded model.
fn select_model(available: &[String]) -> Option<&str> {
    PREFERRED_MODELS
        .iter()
        .find_map(|family| available.iter().find(|name| name.contains(family)))
        .or_else(|| available.first())
        .map(String::as_str)
}

fn build_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    let mut prompt = ENHANCE_PROMPT_TEMPLATE
        .replace("{resume_text}", truncate_chars(resume_text, RESUME_TEXT_LIMIT));
    if let Some(jd) = job_description {
        prompt.push_str(
            &JOB_ALIGNMENT_TEMPLATE
                .replace("{job_description}", truncate_chars(jd, JOB_DESCRIPTION_LIMIT)),
        );
    }
    prompt
}

fn ai_result(
    reply: String,
    resume_text: &str,
    job_description: Option<&str>,
    provider: Provider,
) -> Result<EnhancementResult, ProviderError> {
    if reply.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    Ok(EnhancementResult {
        enhanced_content: resume_text.to_string(),
        suggestions: extract_suggestions(&reply),
        match_score: calculate_match_score(resume_text, job_description),
        provider_used: provider,
        enhancement_method: EnhancementMethod::AiSuggestions,
        model_used: None,
        ai_feedback: Some(reply),
    })
}

/// The fixed suggestions, plus one naming up to five job-description
/// keywords the resume lacks.
pub fn enhance_basic(resume_text: &str, job_description: Option<&str>) -> EnhancementResult {
    let mut suggestions: Vec<String> = BASIC_SUGGESTIONS.iter().map(|s| s.to_string()).collect();

    if let Some(jd) = job_description {
        let resume_keywords = extract_keywords(resume_text);
        let missing: Vec<String> = keyword_sequence(jd)
            .into_iter()
            .filter(|kw| !resume_keywords.contains(kw))
            .take(MAX_GAP_KEYWORDS)
            .collect();
        if !missing.is_empty() {
            suggestions.push(format!(
                "Consider including these relevant keywords: {}",
                missing.join(", ")
            ));
        }
    }

    EnhancementResult {
        enhanced_content: resume_text.to_string(),
        suggestions,
        match_score: calculate_match_score(resume_text, job_description),
        provider_used: Provider::Basic,
        enhancement_method: EnhancementMethod::BasicSuggestions,
        model_used: None,
        ai_feedback: None,
    }
}
