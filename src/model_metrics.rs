use crate::gateway::SentimentApi;
use crate::models::ModelMetrics;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum MetricsState {
    Loading,
    Loaded(ModelMetrics),
    Failed(String),
}

/// Fetches model metrics once, on first activation. There is no refresh.
pub struct MetricsViewer {
    api: Arc<dyn SentimentApi>,
    state: watch::Sender<MetricsState>,
    activated: bool,
}

impl MetricsViewer {
    pub fn new(api: Arc<dyn SentimentApi>) -> Self {
        let (state, _) = watch::channel(MetricsState::Loading);
        Self { api, state, activated: false }
    }

    pub fn state(&self) -> watch::Ref<'_, MetricsState> {
        self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<MetricsState> {
        self.state.subscribe()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub async fn activate(&mut self) {
        if self.activated {
            return;
        }
        let next = match self.api.fetch_metrics().await {
            Ok(metrics) => {
                if metrics.sample_split_consistent() == Some(false) {
                    warn!("training and testing samples do not add up to the total");
                }
                info!(accuracy = metrics.accuracy, "model metrics loaded");
                MetricsState::Loaded(metrics)
            }
            Err(e) => {
                warn!(error = %e, "could not fetch model metrics");
                MetricsState::Failed(e.message)
            }
        };
        // An abandoned fetch leaves the viewer unactivated.
        self.activated = true;
        self.state.send_replace(next);
    }
}
