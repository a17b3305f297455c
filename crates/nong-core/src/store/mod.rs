//! Storage boundary of the assignment engine.
//!
//! The engine never talks to a database directly; it reads and writes through
//! [`AssignmentStore`]. Concrete stores live in `nong-store`.
mod error;
pub use error::StoreError;

use async_trait::async_trait;
use nong_model::{PartnerId, Preference, QuotaSnapshot, Registrant, RegistrantId, SlotCounts};

/// Transactional store holding registrants, the partner pool and assignments.
///
/// Implementations must enforce a global uniqueness constraint: a partner is
/// referenced by at most one slot across all registrants. Violations are
/// reported as [`StoreError::UniqueViolation`] from [`AssignmentStore::atomic_assign`].
#[async_trait]
pub trait AssignmentStore: Send + Sync + 'static {
    /// Partners not referenced by any registrant slot, read at call time.
    async fn read_unassigned_partners(&self) -> Result<Vec<PartnerId>, StoreError>;

    /// Stored preference of a registrant, `None` if the registrant is unknown.
    async fn read_registrant_preference(
        &self,
        id: &RegistrantId,
    ) -> Result<Option<Preference>, StoreError>;

    /// Slot occupancy of a registrant.
    async fn read_slot_counts(&self, id: &RegistrantId) -> Result<SlotCounts, StoreError>;

    /// Registrant counts grouped by (preference, slot count).
    async fn read_quota_snapshot(&self) -> Result<QuotaSnapshot, StoreError>;

    /// Link `partners` to an unassigned registrant in a single transaction.
    ///
    /// Either every slot write commits or none does. A registrant that already
    /// holds a partner is rejected with [`StoreError::SlotOccupied`].
    async fn atomic_assign(
        &self,
        id: &RegistrantId,
        partners: &[PartnerId],
    ) -> Result<(), StoreError>;

    /// Full registrant record, `None` if unknown.
    async fn fetch_registrant(&self, id: &RegistrantId) -> Result<Option<Registrant>, StoreError>;
}
