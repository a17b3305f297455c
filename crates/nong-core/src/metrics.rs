//! Counters and timings of assignment rounds.
//!
//! The engine only talks to [`MetricsBackend`]; exporters such as the
//! Prometheus one live in their own crates and are injected through
//! [`crate::Assigner::with_metrics`].
use std::sync::Arc;

/// How an assignment round ended; used as the `outcome` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignResult {
    Assigned,
    /// Iteration bound reached.
    Exhausted,
    AlreadyAssigned,
    NotFound,
    /// No unassigned partner left.
    PoolExhausted,
    /// Any other fatal error.
    Error,
}

impl AssignResult {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            AssignResult::Assigned => "assigned",
            AssignResult::Exhausted => "exhausted",
            AssignResult::AlreadyAssigned => "already_assigned",
            AssignResult::NotFound => "not_found",
            AssignResult::PoolExhausted => "pool_exhausted",
            AssignResult::Error => "error",
        }
    }
}

/// Sink for engine measurements. Calls happen on the request path and must be cheap.
pub trait MetricsBackend: Send + Sync + 'static {
    fn record_assign_started(&self);

    /// `attempts` counts persist attempts including the successful one;
    /// `duration_ms` covers the whole round.
    fn record_assign_completed(&self, outcome: AssignResult, attempts: u32, duration_ms: u64);

    /// A persist attempt hit the partner uniqueness constraint.
    fn record_storage_conflict(&self);

    /// Time a quota computation spent queued before it started.
    fn record_queue_wait(&self, wait_ms: u64);
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

/// Backend that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_assign_started(&self) {}

    #[inline(always)]
    fn record_assign_completed(&self, _: AssignResult, _: u32, _: u64) {}

    #[inline(always)]
    fn record_storage_conflict(&self) {}

    #[inline(always)]
    fn record_queue_wait(&self, _: u64) {}
}

#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_snake_case_and_distinct() {
        let all = [
            AssignResult::Assigned,
            AssignResult::Exhausted,
            AssignResult::AlreadyAssigned,
            AssignResult::NotFound,
            AssignResult::PoolExhausted,
            AssignResult::Error,
        ];
        let labels: std::collections::HashSet<_> = all.iter().map(|r| r.as_label()).collect();
        assert_eq!(labels.len(), all.len());
        assert!(labels.iter().all(|l| l.chars().all(|c| c.is_ascii_lowercase() || c == '_')));
    }

    #[test]
    fn noop_handle_accepts_everything() {
        let metrics = noop_metrics();
        metrics.record_assign_started();
        metrics.record_assign_completed(AssignResult::Exhausted, 100, 5);
        metrics.record_storage_conflict();
        metrics.record_queue_wait(1);
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }
}
