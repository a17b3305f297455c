use thiserror::Error;

use nong_model::RegistrantId;

use crate::{assign::AssignPhase, queue::QueueError, quota::QuotaError, store::StoreError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse error class, stable across versions; used for metrics labels and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unavailable,
    Computation,
    Internal,
}

impl ErrorKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Computation => "computation",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Fatal outcome of an assignment round.
///
/// Uniqueness conflicts never show up here: the retry loop absorbs them and
/// reports exhaustion through [`crate::AssignOutcome::Exhausted`] instead.
#[derive(Debug, Error)]
pub enum AssignError {
    #[error("registrant not found: {0}")]
    NotFound(RegistrantId),

    #[error("registrant {0} is already fully assigned")]
    AlreadyAssigned(RegistrantId),

    #[error("no unassigned partner left in the pool")]
    PoolExhausted,

    #[error("quota computation failed: {0}")]
    Computation(QuotaError),

    #[error("quota queue failure: {0}")]
    Queue(#[from] QueueError),

    #[error("storage error during {phase}: {source}")]
    Storage {
        phase: AssignPhase,
        source: StoreError,
    },
}

impl AssignError {
    pub(crate) fn storage(phase: AssignPhase) -> impl FnOnce(StoreError) -> AssignError {
        move |source| AssignError::Storage { phase, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AssignError::NotFound(_) => ErrorKind::NotFound,
            AssignError::AlreadyAssigned(_) => ErrorKind::Conflict,
            AssignError::PoolExhausted => ErrorKind::Unavailable,
            AssignError::Computation(_) => ErrorKind::Computation,
            AssignError::Queue(_) | AssignError::Storage { .. } => ErrorKind::Internal,
        }
    }
}

impl From<QuotaError> for AssignError {
    fn from(e: QuotaError) -> Self {
        match e {
            QuotaError::Snapshot(source) => AssignError::Storage {
                phase: AssignPhase::ComputeQuota,
                source,
            },
            other => AssignError::Computation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_failures_are_storage_errors() {
        let err = AssignError::from(QuotaError::Snapshot(StoreError::Backend("io".into())));
        assert!(matches!(
            err,
            AssignError::Storage {
                phase: AssignPhase::ComputeQuota,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn missing_statistics_is_a_computation_error() {
        let err = AssignError::from(QuotaError::MissingStatistics);
        assert_eq!(err.kind(), ErrorKind::Computation);
    }

    #[test]
    fn display_mentions_phase() {
        let err = AssignError::Storage {
            phase: AssignPhase::PersistAttempt,
            source: StoreError::Backend("locked".into()),
        };
        assert_eq!(
            err.to_string(),
            "storage error during persist_attempt: backend error: locked"
        );
    }
}
