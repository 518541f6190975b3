use std::time::Duration;

use anyhow::{Context, Result};

use crate::providers::HostedTask;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3001",
    "http://127.0.0.1:8080",
];

/// Service configuration, read once at startup and handed to every component.
/// Nothing below `main` looks at the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ollama_base_url: String,
    /// Model used for resume structuring. Enhancement picks its own model
    /// from whatever the server has loaded.
    pub ollama_model: String,
    pub huggingface_base_url: String,
    pub huggingface_api_key: Option<String>,
    pub huggingface_model: String,
    /// Inference task of `huggingface_model`; decides what it is sent.
    pub huggingface_task: HostedTask,
    pub allowed_origins: Vec<String>,
    pub max_file_size: usize,
    pub allowed_file_types: Vec<String>,
    /// Timeout for the local structuring call.
    pub ai_timeout: Duration,
    pub max_text_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8001,
            rust_log: "info".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            huggingface_base_url: "https://api-inference.huggingface.co/models".to_string(),
            huggingface_api_key: None,
            huggingface_model: "facebook/bart-large-cnn".to_string(),
            huggingface_task: HostedTask::Summarization,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            max_file_size: 10 * 1024 * 1024,
            allowed_file_types: vec![PDF_MIME.to_string(), DOCX_MIME.to_string()],
            ai_timeout: Duration::from_secs(60),
            max_text_length: 10_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT")?.unwrap_or(defaults.port),
            rust_log: optional_env("RUST_LOG")
                .or_else(|| optional_env("LOG_LEVEL").map(|l| l.to_lowercase()))
                .unwrap_or(defaults.rust_log),
            ollama_base_url: optional_env("OLLAMA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.ollama_base_url),
            ollama_model: optional_env("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            huggingface_base_url: optional_env("HUGGINGFACE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.huggingface_base_url),
            huggingface_api_key: optional_env("HUGGINGFACE_API_KEY"),
            huggingface_model: optional_env("HUGGINGFACE_MODEL")
                .unwrap_or(defaults.huggingface_model),
            huggingface_task: parse_env("HUGGINGFACE_TASK")?
                .unwrap_or(defaults.huggingface_task),
            allowed_origins: optional_env("ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.allowed_origins),
            max_file_size: parse_env("MAX_FILE_SIZE")?.unwrap_or(defaults.max_file_size),
            allowed_file_types: defaults.allowed_file_types,
            ai_timeout: parse_env::<u64>("AI_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.ai_timeout),
            max_text_length: parse_env("MAX_TEXT_LENGTH")?.unwrap_or(defaults.max_text_length),
        })
    }

    pub fn is_allowed_file_type(&self, mime: &str) -> bool {
        self.allowed_file_types.iter().any(|t| t == mime)
    }
}

/// Empty values count as unset, so `HUGGINGFACE_API_KEY=` disables the backend.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Environment variable '{key}' has an invalid value"))
        })
        .transpose()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_ollama() {
        let config = Config::default();
        assert_eq!(config.ollama_base_url, "http://localhost:11434");
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert!(config.huggingface_api_key.is_none());
        assert_eq!(config.huggingface_task, HostedTask::Summarization);
        assert_eq!(config.ai_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_only_pdf_and_docx_are_allowed() {
        let config = Config::default();
        assert!(config.is_allowed_file_type(PDF_MIME));
        assert!(config.is_allowed_file_type(DOCX_MIME));
        assert!(!config.is_allowed_file_type("text/plain"));
    }

    #[test]
    fn test_split_list_drops_blanks() {
        let origins = split_list(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }
}
