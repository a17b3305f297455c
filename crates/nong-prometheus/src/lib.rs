//! Prometheus implementation of [`nong_core::MetricsBackend`].
//!
//! The crate only collects; exposing `/metrics` is left to the HTTP layer,
//! which can call [`PrometheusMetrics::encode`].
//!
//! ## Metrics
//! - `nong_assignments_started_total` - Counter
//! - `nong_assignments_completed_total{outcome}` - Counter
//! - `nong_assignment_attempts{outcome}` - Histogram
//! - `nong_assignment_duration_seconds{outcome}` - Histogram
//! - `nong_storage_conflicts_total` - Counter
//! - `nong_queue_wait_seconds` - Histogram
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
