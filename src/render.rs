//! Plain-text rendering of controller state.

use crate::batch::{BatchState, PREVIEW_LIMIT};
use crate::bridge::View;
use crate::csv_codec::column_help;
use crate::model_metrics::MetricsState;
use crate::models::{HealthStatus, ModelMetrics, ScoreGrade};
use crate::progress::Progress;
use crate::samples;
use crate::single::SingleState;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;
const PREVIEW_TEXT_CHARS: usize = 60;

pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

pub fn service_hint(base_url: &str) -> String {
    format!("Make sure the sentiment API is running at {base_url}")
}

fn bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round()) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Best-effort human timestamp; unknown formats are shown verbatim.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S %:z").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn render_tabs(active: View) -> String {
    View::ALL
        .iter()
        .map(|v| {
            if *v == active {
                format!("[{}]", v.title())
            } else {
                format!(" {} ", v.title())
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn render_single(state: &SingleState, hint: &str) -> String {
    let mut out = String::new();
    match state {
        SingleState::Idle { error: None } => {
            out.push_str("Enter a healthcare review to analyze its sentiment.\n");
        }
        SingleState::Idle { error: Some(message) } => {
            let _ = writeln!(out, "Error: {message}");
        }
        SingleState::Validating | SingleState::Submitting => {
            out.push_str("Analyzing...\n");
        }
        SingleState::Failure(message) => {
            let _ = writeln!(out, "Error: {message}");
            let _ = writeln!(out, "{hint}");
        }
        SingleState::Success(result) => {
            out.push_str("Analysis Results\n");
            let _ = writeln!(out, "  Review Text: {}", result.text);
            let _ = writeln!(out, "  Sentiment:   {}", result.sentiment);
            let _ = writeln!(
                out,
                "  Confidence:  {} {}",
                confidence_percent(result.confidence),
                bar(result.confidence)
            );
            if let Some(model) = &result.model_used {
                let _ = writeln!(out, "  Model used: {model}");
            }
            let _ = writeln!(out, "  Analyzed at: {}", display_timestamp(&result.timestamp));
        }
    }
    out
}

pub fn render_batch(state: &BatchState, progress: Progress, hint: &str) -> String {
    let mut out = String::new();
    match &state.file {
        Some(file) => {
            let _ = writeln!(out, "File: {} ({:.1} KB)", file.name, file.size_kb());
        }
        None => {
            out.push_str("No file selected.\n");
            let _ = writeln!(out, "{}", column_help());
        }
    }
    if let Some(message) = state.error_message() {
        let _ = writeln!(out, "Error: {message}");
        if state.is_service_error() {
            let _ = writeln!(out, "{hint}");
        }
    }
    if state.is_uploading() {
        let _ = writeln!(out, "Processing... {}% {}", progress.percent, bar(f64::from(progress.percent) / 100.0));
    }

    let Some(response) = &state.response else {
        return out;
    };
    let summary = &response.summary;
    out.push_str("\nAnalysis Summary\n");
    let _ = writeln!(out, "  Results from {} reviews", summary.total);
    let _ = writeln!(
        out,
        "  Total: {}  Positive: {}  Negative: {}  Neutral: {}",
        summary.total, summary.positive, summary.negative, summary.neutral
    );

    out.push_str("\nDetailed Results\n");
    let _ = writeln!(out, "  {:>4}  {:<60}  {:<9}  {}", "ID", "Review Text", "Sentiment", "Confidence");
    for row in state.preview() {
        let _ = writeln!(
            out,
            "  {:>4}  {:<60}  {:<9}  {}",
            row.id,
            truncate(&row.text, PREVIEW_TEXT_CHARS),
            row.sentiment.as_str(),
            confidence_percent(row.confidence)
        );
    }
    if state.hidden_rows() > 0 {
        let _ = writeln!(
            out,
            "  Showing first {PREVIEW_LIMIT} results. Download CSV for complete data."
        );
    }
    out
}

fn score_line(out: &mut String, name: &str, score: f64) {
    let _ = writeln!(
        out,
        "  {:<10} {:>6} {} {}",
        name,
        confidence_percent(score),
        bar(score),
        ScoreGrade::for_score(score).label()
    );
}

pub fn render_model_metrics(metrics: &ModelMetrics) -> String {
    let mut out = String::from("Model Performance Metrics\n");
    score_line(&mut out, "Accuracy", metrics.accuracy);
    score_line(&mut out, "Precision", metrics.precision);
    score_line(&mut out, "Recall", metrics.recall);
    score_line(&mut out, "F1 Score", metrics.f1_score);
    if let (Some(train), Some(test), Some(total)) =
        (metrics.training_samples, metrics.testing_samples, metrics.total_samples)
    {
        let _ = writeln!(out, "  Training samples: {train}  Testing samples: {test}  Total: {total}");
    }
    let _ = writeln!(out, "  Last updated: {}", display_timestamp(&metrics.last_updated));
    out
}

pub fn render_metrics(state: &MetricsState, hint: &str) -> String {
    match state {
        MetricsState::Loading => "Loading model metrics...\n".to_string(),
        MetricsState::Loaded(metrics) => render_model_metrics(metrics),
        MetricsState::Failed(message) => format!("Error: {message}\n{hint}\n"),
    }
}

pub fn render_samples() -> String {
    let mut out = String::from("Sample Healthcare Reviews\n");
    for sample in samples::all() {
        let _ = writeln!(out, "  #{} [{}] {}", sample.id, sample.expected_sentiment, sample.text);
    }
    out.push_str("\nCSV Format Example\n");
    for line in samples::CSV_FORMAT_EXAMPLE.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out.push_str("  Supported column names: text, review, comment, feedback\n");
    out
}

pub fn render_health(health: &HealthStatus) -> String {
    format!(
        "Service: {} (model: {}, loaded: {}) at {}\n",
        health.status,
        health.model_type.as_deref().unwrap_or("unknown"),
        health.models_loaded,
        display_timestamp(&health.timestamp)
    )
}
