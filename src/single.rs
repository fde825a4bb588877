//! Single review analysis.

use crate::bridge::Bridge;
use crate::gateway::SentimentApi;
use crate::metrics::ClientMetrics;
use crate::models::{AnalysisRequest, AnalysisResult};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub const EMPTY_TEXT_ERROR: &str = "Please enter some text to analyze";

/// A result and an error are never held at the same time.
#[derive(Debug, Clone, PartialEq)]
pub enum SingleState {
    Idle { error: Option<String> },
    Validating,
    Submitting,
    Success(AnalysisResult),
    Failure(String),
}

impl Default for SingleState {
    fn default() -> Self {
        SingleState::Idle { error: None }
    }
}

impl SingleState {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            SingleState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SingleState::Idle { error: Some(message) } | SingleState::Failure(message) => {
                Some(message)
            }
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SingleState::Validating | SingleState::Submitting)
    }

    /// Errors that came back from the service, as opposed to local validation.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, SingleState::Failure(_))
    }
}

pub struct SingleAnalysisController {
    api: Arc<dyn SentimentApi>,
    bridge: Bridge,
    state: watch::Sender<SingleState>,
    metrics: Option<ClientMetrics>,
}

/// Puts the controller back to `Idle` if a submission is dropped mid-flight,
/// so a cancelled request never leaves it stuck in `Submitting`.
struct InFlight<'a> {
    state: &'a watch::Sender<SingleState>,
    armed: bool,
}

impl InFlight<'_> {
    fn finish(mut self, next: SingleState) {
        self.armed = false;
        self.state.send_replace(next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("single analysis cancelled before a response arrived");
            self.state.send_replace(SingleState::default());
        }
    }
}

impl SingleAnalysisController {
    pub fn new(api: Arc<dyn SentimentApi>, bridge: Bridge) -> Self {
        let (state, _) = watch::channel(SingleState::default());
        Self { api, bridge, state, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> watch::Ref<'_, SingleState> {
        self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SingleState> {
        self.state.subscribe()
    }

    /// Current contents of the shared input.
    pub fn text(&self) -> String {
        self.bridge.pending_text()
    }

    /// A user edit. Clears a pending error; a shown result stays until the
    /// next submission.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.bridge.set_pending_text(text);
        self.state.send_if_modified(|state| match state {
            SingleState::Idle { error: Some(_) } | SingleState::Failure(_) => {
                *state = SingleState::default();
                true
            }
            _ => false,
        });
    }

    /// Mirrors the disabled state of the submit button.
    pub fn can_submit(&self) -> bool {
        !self.state.borrow().is_busy() && !self.text().trim().is_empty()
    }

    /// Validates the pending text and, if non-blank, sends it trimmed.
    pub async fn submit(&mut self) {
        self.state.send_replace(SingleState::Validating);

        let Some(request) = AnalysisRequest::new(&self.text()) else {
            if let Some(m) = &self.metrics {
                m.validation_rejections.inc();
            }
            self.state.send_replace(SingleState::Idle {
                error: Some(EMPTY_TEXT_ERROR.to_string()),
            });
            return;
        };

        // Entering Submitting drops any previous result or error.
        self.state.send_replace(SingleState::Submitting);
        let in_flight = InFlight { state: &self.state, armed: true };
        info!(chars = request.text.chars().count(), "submitting single analysis");

        let next = match self.api.analyze_single(&request.text).await {
            Ok(result) => {
                info!(sentiment = %result.sentiment, confidence = result.confidence, "analysis succeeded");
                SingleState::Success(result)
            }
            Err(e) => {
                warn!(error = %e, "analysis failed");
                SingleState::Failure(e.message)
            }
        };
        in_flight.finish(next);
    }
}
