//! Preference-weighted quota calculator.
//!
//! Decides whether a registrant gets one or two partners this round. Only
//! `PrefersTwo` registrants depend on global accounting; the decision keeps
//! the number of double assignments within the pool capacity:
//!
//! ```text
//! remaining_slots      = capacity - total_registrants - prefers_two_with_2_slots
//! remaining_candidates = prefers_two_with_0_slots
//! P(quota = 2)         = remaining_slots / remaining_candidates
//! ```
mod error;
pub use error::QuotaError;

use nong_model::{Preference, Quota, QuotaSnapshot};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Outcome of one quota computation, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDecision {
    pub quota: Quota,
    pub remaining_slots: i64,
    pub remaining_candidates: u64,
    /// Set when `remaining_slots > remaining_candidates`.
    pub inconsistent: bool,
}

impl QuotaDecision {
    /// Decision that needs no global state.
    pub fn single() -> Self {
        Self {
            quota: Quota::One,
            remaining_slots: 0,
            remaining_candidates: 0,
            inconsistent: false,
        }
    }

    /// Probability of granting two partners that produced this decision.
    pub fn double_probability(&self) -> f64 {
        probability(self.remaining_slots, self.remaining_candidates)
    }
}

/// Quota calculator bound to a fixed pool capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCalculator {
    capacity: u64,
}

impl QuotaCalculator {
    /// `capacity` is the total number of partner identities in the pool.
    pub fn new(capacity: u64) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Decide the quota for a preference that does not need global accounting.
    ///
    /// Returns `None` for `PrefersTwo`, which must go through [`QuotaCalculator::decide`].
    pub fn local(preference: Preference) -> Option<QuotaDecision> {
        if preference.requires_global_accounting() {
            None
        } else {
            Some(QuotaDecision::single())
        }
    }

    /// Decide the quota of a `PrefersTwo` registrant from a fresh snapshot.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        snapshot: &QuotaSnapshot,
        rng: &mut R,
    ) -> Result<QuotaDecision, QuotaError> {
        if snapshot.total_for(Preference::PrefersTwo) == 0 {
            return Err(QuotaError::MissingStatistics);
        }

        let total = snapshot.total() as i64;
        let slots_for_double = self.capacity as i64 - total;
        let taken = snapshot.count(Preference::PrefersTwo, 2) as i64;
        let remaining_slots = slots_for_double - taken;
        let remaining_candidates = snapshot.count(Preference::PrefersTwo, 0);

        let inconsistent = remaining_slots > remaining_candidates as i64;

        let quota = if remaining_candidates > 0
            && rng.random_bool(probability(remaining_slots, remaining_candidates))
        {
            Quota::Two
        } else {
            Quota::One
        };

        Ok(QuotaDecision {
            quota,
            remaining_slots,
            remaining_candidates,
            inconsistent,
        })
    }
}

/// `remaining_slots / remaining_candidates`, clamped into `[0, 1]`.
fn probability(remaining_slots: i64, remaining_candidates: u64) -> f64 {
    if remaining_candidates == 0 || remaining_slots <= 0 {
        return 0.0;
    }
    (remaining_slots as f64 / remaining_candidates as f64).min(1.0)
}
