use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::providers::{HostedModelBackend, LocalModelBackend, Provider, ProviderChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Free,
    /// Metered backends; none is wired in at the moment.
    #[allow(dead_code)]
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendStatus {
    pub available: bool,
    pub status: Readiness,
    pub cost: Cost,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models_count: Option<usize>,
}

/// Snapshot of every backend plus the one `auto` would pick right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStatus {
    pub providers: BTreeMap<Provider, BackendStatus>,
    pub recommended: Provider,
}

/// Probes the configured backends. Nothing is cached: every call reflects
/// the live state of the model server.
#[derive(Clone)]
pub struct ProviderStatusChecker {
    local: Arc<dyn LocalModelBackend>,
    hosted: Arc<dyn HostedModelBackend>,
}

impl ProviderStatusChecker {
    pub fn new(local: Arc<dyn LocalModelBackend>, hosted: Arc<dyn HostedModelBackend>) -> Self {
        Self { local, hosted }
    }

    pub async fn status(&self) -> ProviderStatus {
        let mut providers = BTreeMap::new();

        // An unreachable model server degrades the recommendation; it is not an error.
        let local_models = match self.local.list_models().await {
            Ok(models) => Some(models.len()),
            Err(e) => {
                debug!("Ollama probe failed: {e}");
                None
            }
        };
        providers.insert(
            Provider::Ollama,
            match local_models {
                Some(count) => BackendStatus {
                    available: true,
                    status: Readiness::Ready,
                    cost: Cost::Free,
                    models_count: Some(count),
                },
                None => BackendStatus {
                    available: false,
                    status: Readiness::NotRunning,
                    cost: Cost::Free,
                    models_count: None,
                },
            },
        );

        let hosted_configured = self.hosted.is_configured();
        providers.insert(
            Provider::HuggingFace,
            BackendStatus {
                available: hosted_configured,
                status: if hosted_configured {
                    Readiness::Ready
                } else {
                    Readiness::NotRunning
                },
                cost: Cost::Free,
                models_count: None,
            },
        );

        providers.insert(
            Provider::Basic,
            BackendStatus {
                available: true,
                status: Readiness::Ready,
                cost: Cost::Free,
                models_count: None,
            },
        );

        ProviderStatus {
            providers,
            recommended: recommend(local_models, hosted_configured),
        }
    }

    /// Turns a request's choice into the backend that will actually be called.
    pub async fn resolve(&self, choice: ProviderChoice) -> Provider {
        match choice {
            ProviderChoice::Auto => self.status().await.recommended,
            ProviderChoice::Local => Provider::Ollama,
            ProviderChoice::Hosted => Provider::HuggingFace,
            ProviderChoice::Basic => Provider::Basic,
        }
    }
}

/// Local server with at least one model, then credentialed hosted API,
/// then regex-only processing.
fn recommend(local_models: Option<usize>, hosted_configured: bool) -> Provider {
    match local_models {
        Some(count) if count > 0 => Provider::Ollama,
        _ if hosted_configured => Provider::HuggingFace,
        _ => Provider::Basic,
    }
}
