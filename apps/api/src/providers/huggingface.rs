use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::providers::{
    GenerationOptions, HostedModelBackend, HostedOutput, HostedTask, ProviderError,
};

/// Summary length bounds, in tokens.
const SUMMARY_MAX_LENGTH: u32 = 500;
const SUMMARY_MIN_LENGTH: u32 = 50;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum InferenceParameters {
    Summarization {
        max_length: u32,
        min_length: u32,
    },
    TextGeneration {
        temperature: f32,
        max_new_tokens: u32,
        return_full_text: bool,
    },
}

impl<'a> InferenceRequest<'a> {
    fn new(task: HostedTask, inputs: &'a str, options: &GenerationOptions) -> Self {
        let parameters = match task {
            HostedTask::Summarization => InferenceParameters::Summarization {
                max_length: SUMMARY_MAX_LENGTH,
                min_length: SUMMARY_MIN_LENGTH,
            },
            HostedTask::TextGeneration => InferenceParameters::TextGeneration {
                temperature: options.temperature,
                max_new_tokens: options.max_tokens,
                return_full_text: false,
            },
        };
        Self {
            inputs,
            parameters,
            options: InferenceOptions {
                wait_for_model: true,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

/// Client for the Hugging Face hosted inference API. Without an API key
/// every call fails with `NotConfigured` and no request is sent.
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    model: String,
    task: HostedTask,
    api_key: Option<String>,
}

impl HuggingFaceClient {
    pub fn new(
        base_url: &str,
        model: &str,
        task: HostedTask,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            task,
            api_key,
        })
    }

    fn model_url(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }
}

#[async_trait]
impl HostedModelBackend for HuggingFaceClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn task(&self) -> HostedTask {
        self.task
    }

    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<HostedOutput, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;

        let body = InferenceRequest::new(self.task, prompt, &options);

        let response = self
            .client
            .post(self.model_url())
            .bearer_auth(api_key)
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let output = parse_inference_reply(&text)?;
        debug!("Hugging Face inference succeeded: model={}", self.model);
        Ok(output)
    }
}

/// The inference API answers with `[{"generated_text": ...}]` for text
/// generation models and `[{"summary_text": ...}]` for summarisers; some
/// deployments drop the surrounding array.
fn parse_inference_reply(body: &str) -> Result<HostedOutput, ProviderError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    let item = match &value {
        Value::Array(items) => items.first().ok_or(ProviderError::EmptyResponse)?,
        other => other,
    };

    if let Some(text) = item.get("generated_text").and_then(Value::as_str) {
        return Ok(HostedOutput::Generated(text.to_string()));
    }
    if let Some(text) = item.get("summary_text").and_then(Value::as_str) {
        return Ok(HostedOutput::Summary(text.to_string()));
    }
    if let Some(err) = item.get("error").and_then(Value::as_str) {
        return Err(ProviderError::Malformed(err.to_string()));
    }

    Err(ProviderError::Malformed(format!(
        "unexpected inference payload: {}",
        crate::text::truncate_chars(body, 200)
    )))
}
