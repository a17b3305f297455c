pub mod assign;
pub mod error;
pub mod events;
pub mod inventory;
pub mod metrics;
pub mod queue;
pub mod quota;
pub mod sampler;
pub mod store;

pub use assign::{AssignConfig, AssignOutcome, AssignPhase, Assigner};
pub use error::{AssignError, CoreError, ErrorKind};
pub use events::{AssignEvent, EventHandle, EventSink, FanOut, NoOpEvents, TracingEvents};
pub use metrics::{AssignResult, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use queue::{QueueError, SequentialQueue, Ticket};
pub use quota::{QuotaCalculator, QuotaDecision, QuotaError};
pub use store::{AssignmentStore, StoreError};

pub mod prelude {
    pub use crate::assign::{AssignConfig, AssignOutcome, Assigner};
    pub use crate::error::{AssignError, ErrorKind};
    pub use crate::queue::SequentialQueue;
    pub use crate::store::{AssignmentStore, StoreError};
}
