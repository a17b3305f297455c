//! Diagnostic event log for assignment rounds.
//!
//! Events are fire-and-forget: sinks must never fail the caller and the
//! engine never inspects what a sink did with an event.
use std::sync::Arc;

use nong_model::{PartnerId, RegistrantId};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Event emitted by the assignment engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignEvent {
    /// A quota computation was handed to the sequential queue.
    Queued {
        registrant: RegistrantId,
        task: String,
    },
    /// An assignment round started.
    Started { registrant: RegistrantId },
    /// Partners were persisted.
    Succeeded {
        registrant: RegistrantId,
        iteration: u32,
        partners: Vec<PartnerId>,
    },
    /// The round hit its iteration bound.
    Exhausted {
        registrant: RegistrantId,
        iterations: u32,
    },
    /// Remaining slots exceed remaining candidates; accounting drifted.
    CapacityInconsistency {
        registrant: RegistrantId,
        remaining_slots: i64,
        remaining_candidates: u64,
    },
}

impl AssignEvent {
    /// Stable event kind label.
    pub fn kind(&self) -> &'static str {
        match self {
            AssignEvent::Queued { .. } => "queued",
            AssignEvent::Started { .. } => "started",
            AssignEvent::Succeeded { .. } => "succeeded",
            AssignEvent::Exhausted { .. } => "exhausted",
            AssignEvent::CapacityInconsistency { .. } => "capacity_inconsistency",
        }
    }

    /// Registrant the event refers to.
    pub fn registrant(&self) -> &RegistrantId {
        match self {
            AssignEvent::Queued { registrant, .. }
            | AssignEvent::Started { registrant }
            | AssignEvent::Succeeded { registrant, .. }
            | AssignEvent::Exhausted { registrant, .. }
            | AssignEvent::CapacityInconsistency { registrant, .. } => registrant,
        }
    }
}

/// Destination for [`AssignEvent`]s.
pub trait EventSink: Send + Sync + 'static {
    /// Record an event. Must not block for long and must not panic.
    fn record(&self, event: &AssignEvent);
}

/// Shared handle to an event sink.
pub type EventHandle = Arc<dyn EventSink>;

/// Sink that writes events as structured tracing records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn record(&self, event: &AssignEvent) {
        match event {
            AssignEvent::Queued { registrant, task } => {
                debug!(registrant = %registrant, task = %task, "quota computation queued")
            }
            AssignEvent::Started { registrant } => {
                info!(registrant = %registrant, "assignment started")
            }
            AssignEvent::Succeeded {
                registrant,
                iteration,
                partners,
            } => info!(
                registrant = %registrant,
                iteration = *iteration,
                partners = ?partners,
                "assignment succeeded"
            ),
            AssignEvent::Exhausted {
                registrant,
                iterations,
            } => warn!(
                registrant = %registrant,
                iterations = *iterations,
                "assignment reached iteration limit"
            ),
            AssignEvent::CapacityInconsistency {
                registrant,
                remaining_slots,
                remaining_candidates,
            } => warn!(
                registrant = %registrant,
                remaining_slots = *remaining_slots,
                remaining_candidates = *remaining_candidates,
                "remaining slots exceed remaining candidates"
            ),
        }
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEvents;

impl EventSink for NoOpEvents {
    #[inline(always)]
    fn record(&self, _: &AssignEvent) {}
}

/// Fans an event out to several sinks in order.
pub struct FanOut(Vec<EventHandle>);

impl FanOut {
    pub fn new(sinks: Vec<EventHandle>) -> Self {
        Self(sinks)
    }
}

impl EventSink for FanOut {
    fn record(&self, event: &AssignEvent) {
        for sink in &self.0 {
            sink.record(event);
        }
    }
}

/// Create a handle to the default tracing sink.
#[inline]
pub fn tracing_events() -> EventHandle {
    Arc::new(TracingEvents)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Sink that keeps every event for later inspection.
    #[derive(Default)]
    pub(crate) struct Recorder(pub(crate) Mutex<Vec<AssignEvent>>);

    impl Recorder {
        pub(crate) fn kinds(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().iter().map(|e| e.kind()).collect()
        }
    }

    impl EventSink for Recorder {
        fn record(&self, event: &AssignEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn kind_and_registrant_are_exposed() {
        let ev = AssignEvent::Exhausted {
            registrant: RegistrantId::from("s-1"),
            iterations: 100,
        };
        assert_eq!(ev.kind(), "exhausted");
        assert_eq!(ev.registrant().as_str(), "s-1");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let ev = AssignEvent::Started {
            registrant: RegistrantId::from("s-2"),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["kind"], "started");
        assert_eq!(json["registrant"], "s-2");
    }

    #[test]
    fn fan_out_reaches_every_sink() {
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let fan = FanOut::new(vec![a.clone(), b.clone(), Arc::new(NoOpEvents)]);

        fan.record(&AssignEvent::Started {
            registrant: RegistrantId::from("s-3"),
        });

        assert_eq!(a.kinds(), vec!["started"]);
        assert_eq!(b.kinds(), vec!["started"]);
    }
}
