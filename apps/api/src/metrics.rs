//! Process-wide request counters, served as JSON on `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{extract::State, Json};
use serde::Serialize;

use crate::providers::Provider;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ExtractText,
    ExtractStructured,
    Enhance,
}

#[derive(Debug, Default)]
pub struct ServiceMetrics {
    extract_text_requests: AtomicU64,
    extract_structured_requests: AtomicU64,
    enhance_requests: AtomicU64,
    request_failures: AtomicU64,
    ai_results: AtomicU64,
    basic_results: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestCounts {
    pub extract_text: u64,
    pub extract_structured: u64,
    pub enhance: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: RequestCounts,
    pub request_failures: u64,
    pub ai_results: u64,
    pub basic_results: u64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, endpoint: Endpoint) {
        let counter = match endpoint {
            Endpoint::ExtractText => &self.extract_text_requests,
            Endpoint::ExtractStructured => &self.extract_structured_requests,
            Endpoint::Enhance => &self.enhance_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one structuring or enhancement result by where it came from.
    pub fn record_result(&self, provider: Provider) {
        let counter = match provider {
            Provider::Basic => &self.basic_results,
            Provider::Ollama | Provider::HuggingFace => &self.ai_results,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: RequestCounts {
                extract_text: self.extract_text_requests.load(Ordering::Relaxed),
                extract_structured: self.extract_structured_requests.load(Ordering::Relaxed),
                enhance: self.enhance_requests.load(Ordering::Relaxed),
            },
            request_failures: self.request_failures.load(Ordering::Relaxed),
            ai_results: self.ai_results.load(Ordering::Relaxed),
            basic_results: self.basic_results.load(Ordering::Relaxed),
        }
    }
}

/// GET /metrics
pub async fn handle_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_is_zero() {
        let snapshot = ServiceMetrics::new().snapshot();
        assert_eq!(snapshot.requests.enhance, 0);
        assert_eq!(snapshot.request_failures, 0);
        assert_eq!(snapshot.ai_results + snapshot.basic_results, 0);
    }

    #[test]
    fn test_counters_are_independent() {
        let metrics = ServiceMetrics::new();
        metrics.record_request(Endpoint::ExtractText);
        metrics.record_request(Endpoint::ExtractText);
        metrics.record_request(Endpoint::Enhance);
        metrics.record_failure();
        metrics.record_result(Provider::Ollama);
        metrics.record_result(Provider::HuggingFace);
        metrics.record_result(Provider::Basic);

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot.requests,
            RequestCounts {
                extract_text: 2,
                extract_structured: 0,
                enhance: 1,
            }
        );
        assert_eq!(snapshot.request_failures, 1);
        assert_eq!(snapshot.ai_results, 2);
        assert_eq!(snapshot.basic_results, 1);
    }

    #[test]
    fn test_snapshot_serializes_nested_requests() {
        let metrics = ServiceMetrics::new();
        metrics.record_request(Endpoint::ExtractStructured);
        let value = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(value["requests"]["extract_structured"], 1);
        assert_eq!(value["basic_results"], 0);
    }
}
