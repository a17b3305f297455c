use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, Error)]
pub enum QuotaError {
    #[error("no registrant with preference prefers-two found in statistics")]
    MissingStatistics,

    #[error("failed to read quota statistics: {0}")]
    Snapshot(#[from] StoreError),
}
