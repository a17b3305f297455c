use thiserror::Error;

use nong_model::{PartnerId, RegistrantId};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Another registrant already holds the partner; safe to retry with a fresh pool.
    #[error("partner {partner} is already assigned")]
    UniqueViolation { partner: PartnerId },

    /// The registrant already holds a partner, typically written by a
    /// concurrent request for the same registrant.
    #[error("registrant {registrant} already holds a partner")]
    SlotOccupied { registrant: RegistrantId },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for the only error class the retry loop handles in place.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}
