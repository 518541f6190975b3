//! AI backends. Every call into a model server goes through the clients in
//! this module; callers see them only through `LocalModelBackend` and
//! `HostedModelBackend` so the fallback paths can be exercised with fakes.

pub mod handlers;
pub mod huggingface;
pub mod ollama;
pub mod status;
#[cfg(test)]
pub mod testing;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use huggingface::HuggingFaceClient;
pub use ollama::OllamaClient;
pub use status::{ProviderStatus, ProviderStatusChecker};

/// What the caller asked for. `Auto` is resolved through the status checker
/// before anything is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    Auto,
    Local,
    Hosted,
    Basic,
}

#[derive(Debug, Error)]
#[error("unknown AI provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderChoice {
    type Err = UnknownProvider;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(ProviderChoice::Auto),
            "ollama" | "local" => Ok(ProviderChoice::Local),
            "huggingface" | "hf" | "hosted" => Ok(ProviderChoice::Hosted),
            "basic" => Ok(ProviderChoice::Basic),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

impl ProviderChoice {
    /// Request-side parsing: absent means `Auto`, unrecognised names get the
    /// regex-only provider.
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw.map(str::parse::<ProviderChoice>) {
            None => ProviderChoice::Auto,
            Some(Ok(choice)) => choice,
            Some(Err(e)) => {
                tracing::warn!("{e}, using basic processing");
                ProviderChoice::Basic
            }
        }
    }
}

/// A concrete backend, as reported in status listings and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Ollama,
    HuggingFace,
    Basic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::HuggingFace => "huggingface",
            Provider::Basic => "basic",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("backend returned an empty response")]
    EmptyResponse,

    #[error("no models are loaded")]
    NoModels,

    #[error("no API key configured")]
    NotConfigured,

    #[error("hosted model is a summariser and cannot follow instructions")]
    SummarizerOnly,
}

/// Sampling and transport settings for one generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Hosted inference answers either with free text or, for summarisation
/// models, with a summary of the input.
#[derive(Debug, Clone, PartialEq)]
pub enum HostedOutput {
    Generated(String),
    Summary(String),
}

/// What the hosted model does with its input. Summarisers are sent the raw
/// resume text; text generation models are sent the instruction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostedTask {
    #[default]
    Summarization,
    TextGeneration,
}

#[derive(Debug, Error)]
#[error("unknown hosted task '{0}', expected 'summarization' or 'text-generation'")]
pub struct UnknownHostedTask(pub String);

impl FromStr for HostedTask {
    type Err = UnknownHostedTask;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "summarization" => Ok(HostedTask::Summarization),
            "text-generation" | "text2text-generation" => Ok(HostedTask::TextGeneration),
            other => Err(UnknownHostedTask(other.to_string())),
        }
    }
}

/// A self-hosted model server (Ollama).
#[async_trait]
pub trait LocalModelBackend: Send + Sync {
    /// Names of the models currently loaded. Uses a short probe timeout.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError>;
}

/// A hosted inference API. Availability is decided by credentials alone.
#[async_trait]
pub trait HostedModelBackend: Send + Sync {
    fn is_configured(&self) -> bool;

    fn task(&self) -> HostedTask;

    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<HostedOutput, ProviderError>;
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
