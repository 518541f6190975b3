//! Scripted backends for exercising provider selection and fallback
//! without a model server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::providers::{
    GenerationOptions, HostedModelBackend, HostedOutput, HostedTask, LocalModelBackend,
    ProviderError,
};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub options: GenerationOptions,
}

pub struct FakeLocal {
    models: Option<Vec<String>>,
    reply: Result<String, u16>,
    list_calls: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeLocal {
    /// Server is up, has these models, and answers every prompt with "".
    pub fn with_models(models: &[&str]) -> Self {
        Self {
            models: Some(models.iter().map(|m| m.to_string()).collect()),
            reply: Ok(String::new()),
            list_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            models: None,
            reply: Err(503),
            list_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(mut self, reply: &str) -> Self {
        self.reply = Ok(reply.to_string());
        self
    }

    pub fn failing_with(mut self, status: u16) -> Self {
        self.reply = Err(status);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocalModelBackend for FakeLocal {
    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.models.clone().ok_or(ProviderError::Status {
            status: 503,
            body: "connection refused".to_string(),
        })
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            options,
        });
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ProviderError::Status {
                status: *status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

pub struct FakeHosted {
    configured: bool,
    task: HostedTask,
    reply: Result<HostedOutput, u16>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeHosted {
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            task: HostedTask::Summarization,
            reply: Err(401),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn generating(text: &str) -> Self {
        Self {
            configured: true,
            task: HostedTask::TextGeneration,
            reply: Ok(HostedOutput::Generated(text.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn summarizing(summary: &str) -> Self {
        Self {
            configured: true,
            task: HostedTask::Summarization,
            reply: Ok(HostedOutput::Summary(summary.to_string())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            configured: true,
            task: HostedTask::TextGeneration,
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostedModelBackend for FakeHosted {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn task(&self) -> HostedTask {
        self.task
    }

    async fn generate(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<HostedOutput, ProviderError> {
        if !self.configured {
            return Err(ProviderError::NotConfigured);
        }
        self.calls.lock().unwrap().push(RecordedCall {
            model: String::new(),
            prompt: prompt.to_string(),
            options,
        });
        match &self.reply {
            Ok(output) => Ok(output.clone()),
            Err(status) => Err(ProviderError::Status {
                status: *status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}
