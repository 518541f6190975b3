use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::enhancement::ContentEnhancer;
use crate::extraction::DocumentTextExtractor;
use crate::metrics::ServiceMetrics;
use crate::providers::{
    HostedModelBackend, HuggingFaceClient, LocalModelBackend, OllamaClient, ProviderStatusChecker,
};
use crate::structuring::ResumeStructurer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: DocumentTextExtractor,
    pub status_checker: ProviderStatusChecker,
    pub structurer: ResumeStructurer,
    pub enhancer: ContentEnhancer,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let local: Arc<dyn LocalModelBackend> = Arc::new(
            OllamaClient::new(&config.ollama_base_url).context("Failed to build Ollama client")?,
        );
        let hosted: Arc<dyn HostedModelBackend> = Arc::new(
            HuggingFaceClient::new(
                &config.huggingface_base_url,
                &config.huggingface_model,
                config.huggingface_task,
                config.huggingface_api_key.clone(),
            )
            .context("Failed to build Hugging Face client")?,
        );
        Ok(Self::with_backends(config, local, hosted))
    }

    /// Wires every component to the same pair of backends.
    pub fn with_backends(
        config: Config,
        local: Arc<dyn LocalModelBackend>,
        hosted: Arc<dyn HostedModelBackend>,
    ) -> Self {
        let status_checker = ProviderStatusChecker::new(local.clone(), hosted.clone());
        let structurer =
            ResumeStructurer::new(&config, status_checker.clone(), local.clone(), hosted.clone());
        let enhancer = ContentEnhancer::new(status_checker.clone(), local, hosted);

        Self {
            config,
            extractor: DocumentTextExtractor,
            status_checker,
            structurer,
            enhancer,
            metrics: Arc::new(ServiceMetrics::new()),
        }
    }
}
