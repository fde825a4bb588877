//! Wire types shared with the sentiment service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub text: String,
}

impl AnalysisRequest {
    /// Returns `None` when the text is empty after trimming.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self { text: trimmed.to_string() })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

pub const CSV_MIME: &str = "text/csv";

/// A file chosen for batch upload.
#[derive(Clone, PartialEq, Eq)]
pub struct BatchFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime: Option<String>,
    pub contents: Vec<u8>,
}

impl BatchFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, contents: Vec<u8>) -> Self {
        Self { name: name.into(), size_bytes: contents.len() as u64, mime, contents }
    }

    /// Reads a file from disk. The MIME type is inferred from a `.csv` extension only.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = has_csv_extension(&name).then(|| CSV_MIME.to_string());
        Ok(Self::new(name, mime, contents))
    }

    /// MIME `text/csv` or a `.csv` name (any case).
    pub fn is_csv(&self) -> bool {
        self.mime.as_deref() == Some(CSV_MIME) || has_csv_extension(&self.name)
    }

    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

fn has_csv_extension(name: &str) -> bool {
    name.len() >= 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".csv"))
}

impl fmt::Debug for BatchFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchFile")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .field("mime", &self.mime)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub id: u64,
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[BatchResult]) -> Self {
        let mut summary = Self { total: results.len(), ..Self::default() };
        for result in results {
            match result.sentiment {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Negative => summary.negative += 1,
                Sentiment::Neutral => summary.neutral += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysisResponse {
    pub results: Vec<BatchResult>,
    pub summary: BatchSummary,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

impl BatchAnalysisResponse {
    /// `positive + negative + neutral == total == results.len()`
    pub fn summary_is_consistent(&self) -> bool {
        let s = &self.summary;
        s.positive + s.negative + s.neutral == s.total && s.total == self.results.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub last_updated: String,
    #[serde(default)]
    pub training_samples: Option<u64>,
    #[serde(default)]
    pub testing_samples: Option<u64>,
    #[serde(default)]
    pub total_samples: Option<u64>,
}

impl ModelMetrics {
    /// Whether `training + testing == total`. `None` when any count is missing.
    /// Informational only; the service is trusted as-is.
    pub fn sample_split_consistent(&self) -> Option<bool> {
        match (self.training_samples, self.testing_samples, self.total_samples) {
            (Some(train), Some(test), Some(total)) => Some(train + test == total),
            _ => None,
        }
    }
}

/// Quality band used when rendering a metric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    Excellent,
    Good,
    Poor,
}

impl ScoreGrade {
    pub fn for_score(score: f64) -> Self {
        if score >= 0.9 {
            ScoreGrade::Excellent
        } else if score >= 0.8 {
            ScoreGrade::Good
        } else {
            ScoreGrade::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreGrade::Excellent => "excellent",
            ScoreGrade::Good => "good",
            ScoreGrade::Poor => "needs work",
        }
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub models_loaded: bool,
    #[serde(default)]
    pub model_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReview {
    pub id: u32,
    pub text: &'static str,
    pub expected_sentiment: Sentiment,
}
