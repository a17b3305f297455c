//! Pool inventory reader.
use nong_model::PartnerId;
use tracing::trace;

use crate::store::{AssignmentStore, StoreError};

/// Reads the partners nobody holds yet.
///
/// Never cached: each call reflects the store at call time.
pub struct PoolInventory;

impl PoolInventory {
    pub async fn read<S>(store: &S) -> Result<Vec<PartnerId>, StoreError>
    where
        S: AssignmentStore + ?Sized,
    {
        let pool = store.read_unassigned_partners().await?;
        trace!(available = pool.len(), "pool inventory read");
        Ok(pool)
    }
}
