use std::sync::Arc;

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder, proto::MetricFamily,
};

use nong_core::{AssignResult, MetricsBackend};

const NAMESPACE: &str = "nong";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// `outcome` is the only label and takes the bounded set of [`AssignResult`] labels.
#[derive(Clone)]
pub struct PrometheusMetrics {
    assignments_started: Counter,
    assignments_completed: CounterVec,
    attempts: HistogramVec,
    duration: HistogramVec,
    storage_conflicts: Counter,
    queue_wait: Histogram,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registering into `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let assignments_started = Counter::with_opts(
            Opts::new("assignments_started_total", "Assignment rounds started")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(assignments_started.clone()))?;

        let assignments_completed = CounterVec::new(
            Opts::new("assignments_completed_total", "Assignment rounds finished")
                .namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(assignments_completed.clone()))?;

        let attempts = HistogramVec::new(
            HistogramOpts::new("assignment_attempts", "Persist attempts per assignment round")
                .namespace(NAMESPACE)
                .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(attempts.clone()))?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "assignment_duration_seconds",
                "Wall-clock duration of assignment rounds in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        let storage_conflicts = Counter::with_opts(
            Opts::new(
                "storage_conflicts_total",
                "Uniqueness conflicts reported by the store",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(storage_conflicts.clone()))?;

        let queue_wait = Histogram::with_opts(
            HistogramOpts::new(
                "queue_wait_seconds",
                "Time quota computations wait in the sequential queue",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(queue_wait.clone()))?;

        Ok(Self {
            assignments_started,
            assignments_completed,
            attempts,
            duration,
            storage_conflicts,
            queue_wait,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_assign_started(&self) {
        self.assignments_started.inc();
    }

    fn record_assign_completed(&self, outcome: AssignResult, attempts: u32, duration_ms: u64) {
        let label = [outcome.as_label()];
        self.assignments_completed.with_label_values(&label).inc();
        self.attempts
            .with_label_values(&label)
            .observe(attempts as f64);
        self.duration
            .with_label_values(&label)
            .observe(duration_ms as f64 / 1000.0);
    }

    fn record_storage_conflict(&self) {
        self.storage_conflicts.inc();
    }

    fn record_queue_wait(&self, wait_ms: u64) {
        self.queue_wait.observe(wait_ms as f64 / 1000.0);
    }
}
