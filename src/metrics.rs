use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Client-side request counters, labelled by endpoint path.
#[derive(Clone)]
pub struct ClientMetrics {
    pub requests: IntCounterVec,
    pub failures: IntCounterVec,
    pub validation_rejections: IntCounter,
}

impl ClientMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests = IntCounterVec::new(
            Opts::new("sentiment_client_requests_total", "Requests sent to the sentiment service"),
            &["endpoint"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("sentiment_client_failures_total", "Requests that ended in an error"),
            &["endpoint"],
        )?;
        let validation_rejections = IntCounter::new(
            "sentiment_client_validation_rejections_total",
            "Submissions rejected locally before reaching the network",
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(validation_rejections.clone()))?;
        Ok(Self { requests, failures, validation_rejections })
    }

    pub fn record_request(&self, endpoint: &str) {
        self.requests.with_label_values(&[endpoint]).inc();
    }

    pub fn record_failure(&self, endpoint: &str) {
        self.failures.with_label_values(&[endpoint]).inc();
    }
}
