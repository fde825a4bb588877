//! CSV batch analysis: file selection, upload with progress, summary and export.

use crate::config::{FailedRunPolicy, ProgressConfig};
use crate::csv_codec::{encode_results, export_filename};
use crate::gateway::SentimentApi;
use crate::metrics::ClientMetrics;
use crate::models::{BatchAnalysisResponse, BatchFile, BatchResult};
use crate::progress::{Progress, ProgressTracker};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const NOT_CSV_ERROR: &str = "Please select a CSV file";

/// Rows shown inline; the rest are only reachable through export.
pub const PREVIEW_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    NoFile,
    FileSelected,
    Uploading,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Rejected locally; nothing was sent.
    Validation,
    /// Reported by the service or the transport.
    Service,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub origin: ErrorOrigin,
    pub message: String,
}

impl BatchError {
    fn validation(message: &str) -> Self {
        Self { origin: ErrorOrigin::Validation, message: message.to_string() }
    }

    fn service(message: String) -> Self {
        Self { origin: ErrorOrigin::Service, message }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchState {
    pub phase: BatchPhase,
    pub file: Option<Arc<BatchFile>>,
    pub response: Option<Arc<BatchAnalysisResponse>>,
    pub error: Option<BatchError>,
}

impl BatchState {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Whether the current error came back from the service.
    pub fn is_service_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| e.origin == ErrorOrigin::Service)
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == BatchPhase::Uploading
    }

    /// First [`PREVIEW_LIMIT`] results of the current response.
    pub fn preview(&self) -> &[BatchResult] {
        match &self.response {
            Some(r) => &r.results[..r.results.len().min(PREVIEW_LIMIT)],
            None => &[],
        }
    }

    pub fn hidden_rows(&self) -> usize {
        self.response
            .as_ref()
            .map_or(0, |r| r.results.len().saturating_sub(PREVIEW_LIMIT))
    }
}

/// An export ready to be written or offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub contents: String,
}

pub struct BatchAnalysisController {
    api: Arc<dyn SentimentApi>,
    state: watch::Sender<BatchState>,
    progress: ProgressTracker,
    policy: FailedRunPolicy,
    metrics: Option<ClientMetrics>,
}

/// Restores `FileSelected` if an upload is dropped before it settles.
struct InFlight<'a> {
    state: &'a watch::Sender<BatchState>,
    armed: bool,
}

impl InFlight<'_> {
    fn finish(mut self, apply: impl FnOnce(&mut BatchState)) {
        self.armed = false;
        self.state.send_modify(apply);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("batch upload cancelled before a response arrived");
            self.state.send_modify(|s| s.phase = BatchPhase::FileSelected);
        }
    }
}

impl BatchAnalysisController {
    pub fn new(api: Arc<dyn SentimentApi>, progress: ProgressConfig, policy: FailedRunPolicy) -> Self {
        let (state, _) = watch::channel(BatchState::default());
        Self { api, state, progress: ProgressTracker::new(progress), policy, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> watch::Ref<'_, BatchState> {
        self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchState> {
        self.state.subscribe()
    }

    pub fn progress(&self) -> Progress {
        self.progress.current()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Accepts CSV files only. A rejected file leaves everything but the
    /// error untouched.
    pub fn select_file(&mut self, file: BatchFile) -> bool {
        if !file.is_csv() {
            self.reject(&file.name);
            return false;
        }
        info!(file = %file.name, bytes = file.size_bytes, "batch file selected");
        self.state.send_modify(|s| {
            s.file = Some(Arc::new(file));
            s.error = None;
            s.phase = BatchPhase::FileSelected;
        });
        true
    }

    fn reject(&self, name: &str) {
        warn!(file = %name, "rejected non-CSV file");
        if let Some(m) = &self.metrics {
            m.validation_rejections.inc();
        }
        self.state.send_modify(|s| s.error = Some(BatchError::validation(NOT_CSV_ERROR)));
    }

    pub fn can_submit(&self) -> bool {
        let state = self.state.borrow();
        state.file.is_some() && !state.is_uploading()
    }

    /// Uploads the selected file. Progress climbs while the request is out
    /// and is settled before the outcome is applied.
    pub async fn submit(&mut self) {
        let file = self.state.borrow().file.clone();
        let Some(file) = file else {
            self.reject("<none>");
            return;
        };

        self.state.send_modify(|s| {
            s.phase = BatchPhase::Uploading;
            s.error = None;
        });
        let in_flight = InFlight { state: &self.state, armed: true };
        let ticker = self.progress.start();
        info!(file = %file.name, "uploading batch");

        let outcome = self.api.analyze_batch(&file).await;
        self.progress.settle(ticker);

        let policy = self.policy;
        match outcome {
            Ok(response) => {
                if !response.summary_is_consistent() {
                    warn!(
                        total = response.summary.total,
                        rows = response.results.len(),
                        "batch summary does not match result rows"
                    );
                }
                info!(total = response.summary.total, "batch analysis completed");
                in_flight.finish(|s| {
                    s.response = Some(Arc::new(response));
                    s.error = None;
                    s.phase = BatchPhase::Completed;
                });
            }
            Err(e) => {
                warn!(error = %e, "batch analysis failed");
                in_flight.finish(|s| {
                    if policy == FailedRunPolicy::ClearPrevious {
                        s.response = None;
                    }
                    s.error = Some(BatchError::service(e.message));
                    s.phase = BatchPhase::Failed;
                });
            }
        }
    }

    /// Export of the current results dated today (UTC).
    pub fn export(&self) -> Option<CsvExport> {
        self.export_dated(Utc::now().date_naive())
    }

    pub fn export_dated(&self, date: NaiveDate) -> Option<CsvExport> {
        let state = self.state.borrow();
        let response = state.response.as_ref()?;
        Some(CsvExport {
            filename: export_filename(date),
            contents: encode_results(&response.results),
        })
    }

    /// Writes the export into `dir`. `Ok(None)` when there is nothing to export.
    pub async fn export_to(&self, dir: &Path) -> std::io::Result<Option<PathBuf>> {
        let Some(export) = self.export() else {
            return Ok(None);
        };
        let path = dir.join(&export.filename);
        tokio::fs::write(&path, export.contents.as_bytes()).await?;
        info!(path = %path.display(), "exported batch results");
        Ok(Some(path))
    }
}
