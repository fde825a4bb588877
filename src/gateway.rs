//! HTTP access to the sentiment service.
//!
//! Every call is single-shot. Failures of any kind come back as a
//! [`GatewayError`] whose `message` is what the user should see.

use crate::config::AppConfig;
use crate::metrics::ClientMetrics;
use crate::models::{
    AnalysisRequest, AnalysisResult, BatchAnalysisResponse, BatchFile, HealthStatus, ModelMetrics,
};
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const ANALYZE_PATH: &str = "/api/analyze";
pub const ANALYZE_BATCH_PATH: &str = "/api/analyze-batch";
pub const METRICS_PATH: &str = "/api/metrics";
pub const HEALTH_PATH: &str = "/api/health";

pub const ANALYZE_FAILED: &str = "Analysis failed";
pub const BATCH_FAILED: &str = "Batch analysis failed";

pub const ANALYZE_FALLBACK: &str = "An error occurred while analyzing sentiment";
pub const GENERIC_FALLBACK: &str = "An error occurred";
pub const METRICS_FALLBACK: &str = "An error occurred while fetching metrics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Non-2xx response.
    Status(u16),
    /// Connection, DNS, TLS or timeout failure.
    Transport,
    /// 2xx response whose body was not the expected shape.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Status(code), message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, message)
    }
}

#[async_trait]
pub trait SentimentApi: Send + Sync {
    async fn analyze_single(&self, text: &str) -> Result<AnalysisResult, GatewayError>;

    async fn analyze_batch(&self, file: &BatchFile) -> Result<BatchAnalysisResponse, GatewayError>;

    async fn fetch_metrics(&self) -> Result<ModelMetrics, GatewayError>;

    async fn health(&self) -> Result<HealthStatus, GatewayError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpGateway {
    base_url: String,
    client: Client,
    metrics: Option<ClientMetrics>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), client: Client::new(), metrics: None }
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| GatewayError::transport(e.to_string()))?;
        Ok(Self { base_url: cfg.api_base_url.clone(), client, metrics: None })
    }

    pub fn with_metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response, GatewayError> {
        if let Some(m) = &self.metrics {
            m.record_request(endpoint);
        }
        debug!(endpoint, "sending request");
        request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "request did not complete");
            GatewayError::transport(e.to_string())
        })
    }

    fn track<T>(&self, endpoint: &str, result: Result<T, GatewayError>) -> Result<T, GatewayError> {
        if let (Err(e), Some(m)) = (&result, &self.metrics) {
            m.record_failure(endpoint);
            debug!(endpoint, error = %e, "request failed");
        }
        result
    }
}

/// Non-2xx responses surface the body's `error` field, or `default` when the
/// body is missing, unparsable or has an empty `error`.
async fn error_from_body(resp: Response, default: &str) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default.to_string());
    Err(GatewayError::status(status.as_u16(), message))
}

fn error_from_status(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(GatewayError::status(
            status.as_u16(),
            format!("HTTP error! status: {}", status.as_u16()),
        ))
    }
}

async fn decode<T: DeserializeOwned>(resp: Response, fallback: &str) -> Result<T, GatewayError> {
    resp.json::<T>().await.map_err(|e| {
        warn!(error = %e, "unexpected response body");
        GatewayError::new(GatewayErrorKind::Decode, fallback)
    })
}

#[async_trait]
impl SentimentApi for HttpGateway {
    async fn analyze_single(&self, text: &str) -> Result<AnalysisResult, GatewayError> {
        let body = AnalysisRequest { text: text.to_string() };
        let result: Result<AnalysisResult, GatewayError> = async {
            let resp = self
                .send(ANALYZE_PATH, self.client.post(self.url(ANALYZE_PATH)).json(&body))
                .await?;
            let resp = error_from_body(resp, ANALYZE_FAILED).await?;
            decode(resp, ANALYZE_FALLBACK).await
        }
        .await;
        self.track(ANALYZE_PATH, result)
    }

    async fn analyze_batch(&self, file: &BatchFile) -> Result<BatchAnalysisResponse, GatewayError> {
        let result: Result<BatchAnalysisResponse, GatewayError> = async {
            let part = multipart::Part::bytes(file.contents.clone())
                .file_name(file.name.clone())
                .mime_str(file.mime.as_deref().unwrap_or("text/csv"))
                .map_err(|e| GatewayError::transport(e.to_string()))?;
            let form = multipart::Form::new().part("file", part);
            let resp = self
                .send(
                    ANALYZE_BATCH_PATH,
                    self.client.post(self.url(ANALYZE_BATCH_PATH)).multipart(form),
                )
                .await?;
            let resp = error_from_body(resp, BATCH_FAILED).await?;
            decode(resp, GENERIC_FALLBACK).await
        }
        .await;
        self.track(ANALYZE_BATCH_PATH, result)
    }

    async fn fetch_metrics(&self) -> Result<ModelMetrics, GatewayError> {
        let result: Result<ModelMetrics, GatewayError> = async {
            let resp = self
                .send(METRICS_PATH, self.client.get(self.url(METRICS_PATH)))
                .await?;
            let resp = error_from_status(resp)?;
            decode(resp, METRICS_FALLBACK).await
        }
        .await;
        self.track(METRICS_PATH, result)
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let result: Result<HealthStatus, GatewayError> = async {
            let resp = self
                .send(HEALTH_PATH, self.client.get(self.url(HEALTH_PATH)))
                .await?;
            let resp = error_from_status(resp)?;
            decode(resp, GENERIC_FALLBACK).await
        }
        .await;
        self.track(HEALTH_PATH, result)
    }
}
