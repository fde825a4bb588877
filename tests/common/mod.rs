#![allow(dead_code)]

use async_trait::async_trait;
use sentiment_client::gateway::{GatewayError, SentimentApi};
use sentiment_client::models::{
    AnalysisResult, BatchAnalysisResponse, BatchFile, BatchResult, BatchSummary, HealthStatus,
    ModelMetrics, Sentiment,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted service: each call pops the next queued reply after `delay`.
#[derive(Default)]
pub struct FakeApi {
    pub delay: Duration,
    single: Mutex<VecDeque<Result<AnalysisResult, GatewayError>>>,
    batch: Mutex<VecDeque<Result<BatchAnalysisResponse, GatewayError>>>,
    metrics: Mutex<VecDeque<Result<ModelMetrics, GatewayError>>>,
    pub sent_texts: Mutex<Vec<String>>,
    pub uploaded: Mutex<Vec<String>>,
    pub metrics_calls: Mutex<usize>,
}

impl FakeApi {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub fn push_single(&self, reply: Result<AnalysisResult, GatewayError>) {
        self.single.lock().unwrap().push_back(reply);
    }

    pub fn push_batch(&self, reply: Result<BatchAnalysisResponse, GatewayError>) {
        self.batch.lock().unwrap().push_back(reply);
    }

    pub fn push_metrics(&self, reply: Result<ModelMetrics, GatewayError>) {
        self.metrics.lock().unwrap().push_back(reply);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent_texts.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploaded.lock().unwrap().len()
    }

    pub fn metrics_call_count(&self) -> usize {
        *self.metrics_calls.lock().unwrap()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl SentimentApi for FakeApi {
    async fn analyze_single(&self, text: &str) -> Result<AnalysisResult, GatewayError> {
        self.sent_texts.lock().unwrap().push(text.to_string());
        self.pause().await;
        let reply = self.single.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(analysis(text, Sentiment::Neutral, 0.5)))
    }

    async fn analyze_batch(&self, file: &BatchFile) -> Result<BatchAnalysisResponse, GatewayError> {
        self.uploaded.lock().unwrap().push(file.name.clone());
        self.pause().await;
        let reply = self.batch.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(batch_response(&["fine"])))
    }

    async fn fetch_metrics(&self) -> Result<ModelMetrics, GatewayError> {
        *self.metrics_calls.lock().unwrap() += 1;
        self.pause().await;
        let reply = self.metrics.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(model_metrics()))
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        Ok(HealthStatus {
            status: "healthy".into(),
            timestamp: "2024-08-04T10:00:00".into(),
            models_loaded: true,
            model_type: Some("trained_model".into()),
        })
    }
}

pub fn analysis(text: &str, sentiment: Sentiment, confidence: f64) -> AnalysisResult {
    AnalysisResult {
        text: text.to_string(),
        sentiment,
        confidence,
        timestamp: "2024-08-04T10:00:00.000000".into(),
        model_used: Some("trained_model".into()),
    }
}

/// Rows alternate positive, negative, neutral.
pub fn batch_response(texts: &[&str]) -> BatchAnalysisResponse {
    let labels = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];
    let results: Vec<BatchResult> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| BatchResult {
            id: i as u64 + 1,
            text: text.to_string(),
            sentiment: labels[i % 3],
            confidence: 0.75,
        })
        .collect();
    BatchAnalysisResponse {
        summary: BatchSummary::from_results(&results),
        results,
        timestamp: "2024-08-04T10:00:00".into(),
        model_used: None,
    }
}

pub fn model_metrics() -> ModelMetrics {
    ModelMetrics {
        accuracy: 0.821,
        precision: 0.79,
        recall: 0.82,
        f1_score: 0.78,
        last_updated: "2024-08-04".into(),
        training_samples: Some(8334),
        testing_samples: Some(866),
        total_samples: Some(9200),
    }
}

pub fn csv_file(name: &str) -> BatchFile {
    BatchFile::new(name, None, b"text\n\"Great staff\"\n".to_vec())
}
