use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::providers::{GenerationOptions, LocalModelBackend, ProviderError};

const TAGS_PATH: &str = "/api/tags";
const GENERATE_PATH: &str = "/api/generate";
/// Reachability probes must not hold up a request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const TOP_P: f32 = 0.9;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Debug, Serialize)]
struct SamplingOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for a local Ollama server.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl LocalModelBackend for OllamaClient {
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(self.url(TAGS_PATH))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;

        let tags: TagsResponse = read_json(response).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: SamplingOptions {
                temperature: options.temperature,
                top_p: TOP_P,
                num_predict: options.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.url(GENERATE_PATH))
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await?;

        let reply: GenerateResponse = read_json(response).await?;
        debug!(
            "Ollama generation succeeded: model={}, chars={}",
            model,
            reply.response.len()
        );
        Ok(reply.response)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_response_reads_model_names() {
        let json = r#"{"models": [{"name": "llama3.2:3b", "size": 1}, {"name": "mistral:7b"}]}"#;
        let tags: TagsResponse = serde_json::from_str(json).unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.2:3b", "mistral:7b"]);
    }

    #[test]
    fn test_tags_response_without_models_field() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }

    #[test]
    fn test_generate_request_shape() {
        let body = GenerateRequest {
            model: "llama3.2:3b",
            prompt: "hi",
            stream: false,
            options: SamplingOptions {
                temperature: 0.1,
                top_p: TOP_P,
                num_predict: 800,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["options"]["num_predict"], 800);
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = OllamaClient::new("http://localhost:11434/").unwrap();
        assert_eq!(client.url(TAGS_PATH), "http://localhost:11434/api/tags");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let client = OllamaClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.list_models().await.is_err());
    }
}
