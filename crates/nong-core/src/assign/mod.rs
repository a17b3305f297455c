//! Assignment retry loop.
//!
//! One call to [`Assigner::assign`] runs a whole round for a registrant:
//! read the preference once, then iterate `read pool -> compute quota ->
//! check slots -> sample -> persist` until a persist commits, a fatal error
//! occurs, or the iteration bound is reached.
//!
//! A registrant gets at most one successful round: once any slot holds a
//! partner, later requests end with [`AssignError::AlreadyAssigned`].
//!
//! Only uniqueness conflicts from the store are retried; every other failure
//! ends the round immediately.
mod config;
pub use config::{AssignConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_POOL_CAPACITY};

mod phase;
pub use phase::AssignPhase;

use std::{sync::Arc, time::Instant};

use nong_model::{PartnerId, Preference, RegistrantId};
use tracing::{debug, instrument, trace};

use crate::{
    error::AssignError,
    events::{AssignEvent, EventHandle, tracing_events},
    inventory::PoolInventory,
    metrics::{AssignResult, MetricsHandle, noop_metrics},
    queue::{SequentialQueue, make_task_id},
    quota::{QuotaCalculator, QuotaDecision},
    sampler,
    store::{AssignmentStore, StoreError},
};

/// Successful (non-fatal) end of an assignment round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Partners were persisted at the 0-based `iteration`.
    Assigned {
        iteration: u32,
        partners: Vec<PartnerId>,
    },
    /// Every iteration hit a uniqueness conflict.
    Exhausted { iterations: u32 },
}

/// Assignment engine over a store.
pub struct Assigner<S: ?Sized> {
    store: Arc<S>,
    queue: SequentialQueue,
    calculator: QuotaCalculator,
    max_iterations: u32,
    events: EventHandle,
    metrics: MetricsHandle,
}

impl<S> Assigner<S>
where
    S: AssignmentStore + ?Sized,
{
    /// Create an engine with tracing events and no-op metrics.
    ///
    /// `queue` is the process-wide sequential queue; share one instance between
    /// every engine that draws from the same pool.
    pub fn new(store: Arc<S>, queue: SequentialQueue, config: &AssignConfig) -> Self {
        Self {
            store,
            queue,
            calculator: QuotaCalculator::new(config.pool_capacity),
            max_iterations: config.max_iterations,
            events: tracing_events(),
            metrics: noop_metrics(),
        }
    }

    /// Replace the event sink and return updated engine.
    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = events;
        self
    }

    /// Replace the metrics backend and return updated engine.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Iteration bound of a round.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run one assignment round for `id`.
    #[instrument(level = "debug", skip(self, id), fields(registrant = %id))]
    pub async fn assign(&self, id: &RegistrantId) -> Result<AssignOutcome, AssignError> {
        let started_at = Instant::now();
        self.metrics.record_assign_started();
        self.events.record(&AssignEvent::Started {
            registrant: id.clone(),
        });

        let result = self.run(id).await;

        let (label, attempts) = match &result {
            Ok(AssignOutcome::Assigned { iteration, partners }) => {
                self.events.record(&AssignEvent::Succeeded {
                    registrant: id.clone(),
                    iteration: *iteration,
                    partners: partners.clone(),
                });
                (AssignResult::Assigned, iteration + 1)
            }
            Ok(AssignOutcome::Exhausted { iterations }) => {
                self.events.record(&AssignEvent::Exhausted {
                    registrant: id.clone(),
                    iterations: *iterations,
                });
                (AssignResult::Exhausted, *iterations)
            }
            Err(AssignError::NotFound(_)) => (AssignResult::NotFound, 0),
            Err(AssignError::AlreadyAssigned(_)) => (AssignResult::AlreadyAssigned, 0),
            Err(AssignError::PoolExhausted) => (AssignResult::PoolExhausted, 0),
            Err(_) => (AssignResult::Error, 0),
        };
        self.metrics.record_assign_completed(
            label,
            attempts,
            started_at.elapsed().as_millis() as u64,
        );
        result
    }

    async fn run(&self, id: &RegistrantId) -> Result<AssignOutcome, AssignError> {
        let preference = self
            .store
            .read_registrant_preference(id)
            .await
            .map_err(AssignError::storage(AssignPhase::ReadPreference))?
            .ok_or_else(|| AssignError::NotFound(id.clone()))?;
        debug!(preference = %preference, "preference read");

        for iteration in 0..self.max_iterations {
            let pool = PoolInventory::read(&*self.store)
                .await
                .map_err(AssignError::storage(AssignPhase::ReadPool))?;

            let decision = self.compute_quota(id, preference).await?;

            let slots = self
                .store
                .read_slot_counts(id)
                .await
                .map_err(AssignError::storage(AssignPhase::CheckAlreadyAssigned))?;
            if slots.is_assigned() {
                return Err(AssignError::AlreadyAssigned(id.clone()));
            }

            let Some(quota) = decision.quota.clamp_to(pool.len()) else {
                return Err(AssignError::PoolExhausted);
            };
            let partners = sampler::sample(&mut rand::rng(), &pool, quota.count());
            trace!(
                iteration,
                quota = quota.count(),
                partners = ?partners,
                "persisting sampled partners"
            );

            match self.store.atomic_assign(id, &partners).await {
                Ok(()) => return Ok(AssignOutcome::Assigned {
                    iteration,
                    partners,
                }),
                Err(e) if e.is_retryable() => {
                    self.metrics.record_storage_conflict();
                    debug!(iteration, error = %e, "uniqueness conflict; retrying");
                }
                Err(StoreError::SlotOccupied { .. }) => {
                    return Err(AssignError::AlreadyAssigned(id.clone()));
                }
                Err(e) => return Err(AssignError::storage(AssignPhase::PersistAttempt)(e)),
            }
        }

        Ok(AssignOutcome::Exhausted {
            iterations: self.max_iterations,
        })
    }

    /// Quota for this iteration; `PrefersTwo` goes through the sequential queue.
    async fn compute_quota(
        &self,
        id: &RegistrantId,
        preference: Preference,
    ) -> Result<QuotaDecision, AssignError> {
        if let Some(decision) = QuotaCalculator::local(preference) {
            return Ok(decision);
        }

        let task = make_task_id("quota", id.as_str());
        self.events.record(&AssignEvent::Queued {
            registrant: id.clone(),
            task: task.clone(),
        });

        let store = Arc::clone(&self.store);
        let calculator = self.calculator;
        let metrics = Arc::clone(&self.metrics);
        let queued_at = Instant::now();

        let decision = self
            .queue
            .enqueue(task, move || async move {
                metrics.record_queue_wait(queued_at.elapsed().as_millis() as u64);
                let snapshot = store.read_quota_snapshot().await?;
                calculator.decide(&snapshot, &mut rand::rng())
            })
            .await??;

        if decision.inconsistent {
            self.events.record(&AssignEvent::CapacityInconsistency {
                registrant: id.clone(),
                remaining_slots: decision.remaining_slots,
                remaining_candidates: decision.remaining_candidates,
            });
        }
        trace!(quota = decision.quota.count(), "quota decided");
        Ok(decision)
    }
}
