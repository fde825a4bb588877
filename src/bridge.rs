//! Shared state between the views.
//!
//! [`Bridge`] owns the pending single-analysis text and the active view.
//! The sample list writes to it; the single-analysis controller reads from
//! it. Nothing else crosses view boundaries.

use crate::models::SampleReview;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Single,
    Batch,
    Metrics,
    Samples,
}

impl View {
    pub const ALL: [View; 4] = [View::Single, View::Batch, View::Metrics, View::Samples];

    pub fn key(&self) -> &'static str {
        match self {
            View::Single => "single",
            View::Batch => "batch",
            View::Metrics => "metrics",
            View::Samples => "samples",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Single => "Single Analysis",
            View::Batch => "Batch Analysis",
            View::Metrics => "Model Performance",
            View::Samples => "Sample Reviews",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        View::ALL.into_iter().find(|v| v.key() == key)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

struct Shared {
    pending_text: watch::Sender<String>,
    active_view: watch::Sender<View>,
}

#[derive(Clone)]
pub struct Bridge {
    shared: Arc<Shared>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(View::Single)
    }
}

impl Bridge {
    pub fn new(initial: View) -> Self {
        let (pending_text, _) = watch::channel(String::new());
        let (active_view, _) = watch::channel(initial);
        Self { shared: Arc::new(Shared { pending_text, active_view }) }
    }

    pub fn pending_text(&self) -> String {
        self.shared.pending_text.borrow().clone()
    }

    pub fn set_pending_text(&self, text: impl Into<String>) {
        self.shared.pending_text.send_replace(text.into());
    }

    pub fn subscribe_text(&self) -> watch::Receiver<String> {
        self.shared.pending_text.subscribe()
    }

    pub fn active_view(&self) -> View {
        *self.shared.active_view.borrow()
    }

    pub fn activate(&self, view: View) {
        self.shared.active_view.send_if_modified(|current| {
            let changed = *current != view;
            *current = view;
            changed
        });
    }

    pub fn subscribe_view(&self) -> watch::Receiver<View> {
        self.shared.active_view.subscribe()
    }

    /// Loads a sample into the single-analysis input and switches to that view.
    pub fn test_sample(&self, sample: &SampleReview) {
        info!(sample_id = sample.id, "loading sample into single analysis");
        self.set_pending_text(sample.text);
        self.activate(View::Single);
    }

    /// Copies a sample's text without touching any view state.
    pub fn copy_sample(
        &self,
        sample: &SampleReview,
        clipboard: &mut dyn Clipboard,
    ) -> Result<(), ClipboardError> {
        clipboard.set_text(sample.text)
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to initialize clipboard: {0}")]
    Init(String),
    #[error("failed to set clipboard text: {0}")]
    Write(String),
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new().map_err(|e| ClipboardError::Init(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Keeps the last copied text; used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_owned());
        Ok(())
    }
}
