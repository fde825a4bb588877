//! Cosmetic upload progress.
//!
//! The estimate is not derived from bytes sent. It climbs by a fixed step on
//! a timer while a request is outstanding, stops at a cap, jumps to 100 when
//! the request settles and drops back to 0 after a short delay. Timer tasks
//! are owned by [`TaskGuard`]s so they die with the run that started them.

use crate::config::ProgressConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::trace;

/// Aborts the wrapped task when dropped.
#[derive(Debug)]
pub struct TaskGuard(JoinHandle<()>);

impl TaskGuard {
    pub fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Idle,
    Estimating,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub phase: ProgressPhase,
}

impl Default for Progress {
    fn default() -> Self {
        Self { percent: 0, phase: ProgressPhase::Idle }
    }
}

impl Progress {
    pub fn begin(&mut self) {
        *self = Self { percent: 0, phase: ProgressPhase::Estimating };
    }

    /// One timer tick. Returns whether the value changed.
    pub fn advance(&mut self, step: u8, cap: u8) -> bool {
        if self.phase != ProgressPhase::Estimating || self.percent >= cap {
            return false;
        }
        self.percent = self.percent.saturating_add(step).min(cap);
        true
    }

    pub fn settle(&mut self) -> bool {
        if self.phase != ProgressPhase::Estimating {
            return false;
        }
        *self = Self { percent: 100, phase: ProgressPhase::Settled };
        true
    }

    pub fn reset(&mut self) -> bool {
        if self.phase != ProgressPhase::Settled {
            return false;
        }
        *self = Self::default();
        true
    }
}

pub struct ProgressTracker {
    config: ProgressConfig,
    state: Arc<watch::Sender<Progress>>,
    reset_timer: Option<TaskGuard>,
}

impl ProgressTracker {
    pub fn new(config: ProgressConfig) -> Self {
        let (tx, _) = watch::channel(Progress::default());
        Self { config, state: Arc::new(tx), reset_timer: None }
    }

    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.state.subscribe()
    }

    pub fn current(&self) -> Progress {
        *self.state.borrow()
    }

    /// Starts a new estimate. The returned guard owns the ticker; dropping it
    /// stops the estimate where it is.
    pub fn start(&mut self) -> TaskGuard {
        self.reset_timer = None;
        self.state.send_modify(Progress::begin);

        let state = Arc::clone(&self.state);
        let ProgressConfig { step, cap, .. } = self.config;
        let period = self.config.interval();
        TaskGuard::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                let mut done = false;
                state.send_if_modified(|p| {
                    let changed = p.advance(step, cap);
                    done = p.percent >= cap || p.phase != ProgressPhase::Estimating;
                    changed
                });
                if done {
                    trace!(cap, "progress estimate reached cap");
                    break;
                }
            }
        })
    }

    /// Stops the ticker, shows 100 and schedules the return to 0.
    pub fn settle(&mut self, ticker: TaskGuard) {
        drop(ticker);
        self.state.send_if_modified(Progress::settle);

        let state = Arc::clone(&self.state);
        let delay = self.config.reset_delay();
        self.reset_timer = Some(TaskGuard::spawn(async move {
            sleep(delay).await;
            state.send_if_modified(Progress::reset);
        }));
    }
}
