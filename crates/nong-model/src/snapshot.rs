use serde::{Deserialize, Serialize};

use crate::{MAX_SLOTS, ModelError, ModelResult, Preference};

/// Registrant counts grouped by (preference, occupied slot count).
///
/// Built fresh for every quota decision and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    counts: [[u64; MAX_SLOTS + 1]; 3],
}

impl QuotaSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` registrants with the given preference and slot count.
    pub fn add(&mut self, preference: Preference, slots: u8, n: u64) -> ModelResult<()> {
        let idx = slots as usize;
        if idx > MAX_SLOTS {
            return Err(ModelError::InvalidSlotCount(slots));
        }
        self.counts[preference.as_index()][idx] += n;
        Ok(())
    }

    /// Builder-style variant of [`QuotaSnapshot::add`].
    pub fn with(mut self, preference: Preference, slots: u8, n: u64) -> ModelResult<Self> {
        self.add(preference, slots, n)?;
        Ok(self)
    }

    /// Registrants with this preference holding exactly `slots` partners.
    pub fn count(&self, preference: Preference, slots: u8) -> u64 {
        self.counts[preference.as_index()]
            .get(slots as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Registrants with this preference, regardless of slot count.
    pub fn total_for(&self, preference: Preference) -> u64 {
        self.counts[preference.as_index()].iter().sum()
    }

    /// All registrants.
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}
