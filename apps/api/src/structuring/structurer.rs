use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::providers::{
    strip_json_fences, GenerationOptions, HostedModelBackend, HostedOutput, HostedTask,
    LocalModelBackend, Provider, ProviderChoice, ProviderError, ProviderStatusChecker,
};
use crate::structuring::basic::structure_basic;
use crate::structuring::models::{ExtractionMethod, ResumeFields, StructuredResume};
use crate::structuring::prompts::{PROMPT_TEXT_LIMIT, STRUCTURE_PROMPT_TEMPLATE};
use crate::text::truncate_chars;

const STRUCTURE_TEMPERATURE: f32 = 0.1;
const STRUCTURE_MAX_TOKENS: u32 = 800;
const HOSTED_TIMEOUT: Duration = Duration::from_secs(30);
/// Characters of a prose reply kept as the summary.
const SHELL_SUMMARY_CHARS: usize = 500;
/// Characters of resume text handed to a hosted summariser.
const SUMMARY_INPUT_CHARS: usize = 1000;

/// Turns resume text into a `StructuredResume` through the requested
/// backend. Any backend failure is answered with the regex result instead;
/// the backend is never retried.
#[derive(Clone)]
pub struct ResumeStructurer {
    status: ProviderStatusChecker,
    local: Arc<dyn LocalModelBackend>,
    hosted: Arc<dyn HostedModelBackend>,
    local_model: String,
    local_timeout: Duration,
}

impl ResumeStructurer {
    pub fn new(
        config: &Config,
        status: ProviderStatusChecker,
        local: Arc<dyn LocalModelBackend>,
        hosted: Arc<dyn HostedModelBackend>,
    ) -> Self {
        Self {
            status,
            local,
            hosted,
            local_model: config.ollama_model.clone(),
            local_timeout: config.ai_timeout,
        }
    }

    pub async fn process(&self, text: &str, choice: ProviderChoice, job_id: &str) -> StructuredResume {
        let provider = self.status.resolve(choice).await;
        info!(
            "Structuring resume: job_id={job_id}, provider={provider}, text_length={}",
            text.len()
        );

        let attempt = match provider {
            Provider::Ollama => self.structure_with_local(text).await,
            Provider::HuggingFace => self.structure_with_hosted(text).await,
            Provider::Basic => return structure_basic(text),
        };

        match attempt {
            Ok(resume) => resume,
            Err(e) => {
                warn!("AI structuring failed, falling back to basic: job_id={job_id}, provider={provider}, error={e}");
                structure_basic(text)
            }
        }
    }

    async fn structure_with_local(&self, text: &str) -> Result<StructuredResume, ProviderError> {
        let options = GenerationOptions {
            temperature: STRUCTURE_TEMPERATURE,
            max_tokens: STRUCTURE_MAX_TOKENS,
            timeout: self.local_timeout,
        };
        let reply = self
            .local
            .generate(&self.local_model, &build_prompt(text), options)
            .await?;
        parse_ai_response(&reply, Provider::Ollama)
    }

    async fn structure_with_hosted(&self, text: &str) -> Result<StructuredResume, ProviderError> {
        let options = GenerationOptions {
            temperature: STRUCTURE_TEMPERATURE,
            max_tokens: STRUCTURE_MAX_TOKENS,
            timeout: HOSTED_TIMEOUT,
        };
        let input = match self.hosted.task() {
            HostedTask::Summarization => truncate_chars(text, SUMMARY_INPUT_CHARS).to_string(),
            HostedTask::TextGeneration => build_prompt(text),
        };
        match self.hosted.generate(&input, options).await? {
            HostedOutput::Generated(reply) => parse_ai_response(&reply, Provider::HuggingFace),
            HostedOutput::Summary(summary) => Ok(merge_summary(text, summary)),
        }
    }
}

fn build_prompt(text: &str) -> String {
    STRUCTURE_PROMPT_TEMPLATE.replace("{resume_text}", truncate_chars(text, PROMPT_TEXT_LIMIT))
}

/// JSON replies are read against the schema; anything else, including JSON
/// that does not parse, is kept as prose. Only an empty reply is an error.
fn parse_ai_response(content: &str, provider: Provider) -> Result<StructuredResume, ProviderError> {
    let trimmed = strip_json_fences(content);
    if trimmed.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    if trimmed.starts_with('{') {
        if let Ok(mut fields) = serde_json::from_str::<ResumeFields>(trimmed) {
            fields.dedup_skills();
            return Ok(StructuredResume {
                fields,
                provider_used: provider,
                extraction_method: ExtractionMethod::AiStructured,
                ai_response: None,
            });
        }
    }

    Ok(text_shell(content, provider))
}

fn text_shell(content: &str, provider: Provider) -> StructuredResume {
    StructuredResume {
        fields: ResumeFields {
            summary: Some(truncate_chars(content, SHELL_SUMMARY_CHARS).to_string()),
            ..Default::default()
        },
        provider_used: provider,
        extraction_method: ExtractionMethod::AiTextParsing,
        ai_response: Some(content.to_string()),
    }
}

fn merge_summary(text: &str, summary: String) -> StructuredResume {
    let mut resume = structure_basic(text);
    resume.fields.summary = Some(summary);
    resume.provider_used = Provider::HuggingFace;
    resume.extraction_method = ExtractionMethod::AiSummary;
    resume
}
