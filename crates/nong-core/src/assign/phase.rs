use std::fmt;

/// Fallible steps of an assignment round, attached to storage errors.
///
/// `ReadPreference -> (ReadPool -> ComputeQuota -> CheckAlreadyAssigned
/// -> PersistAttempt)*`, looping back to `ReadPool` on a uniqueness conflict.
/// Sampling between the slot check and the persist cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignPhase {
    ReadPreference,
    ReadPool,
    ComputeQuota,
    CheckAlreadyAssigned,
    PersistAttempt,
}

impl AssignPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignPhase::ReadPreference => "read_preference",
            AssignPhase::ReadPool => "read_pool",
            AssignPhase::ComputeQuota => "compute_quota",
            AssignPhase::CheckAlreadyAssigned => "check_already_assigned",
            AssignPhase::PersistAttempt => "persist_attempt",
        }
    }
}

impl fmt::Display for AssignPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
