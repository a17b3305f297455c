//! Common model-level constants.

/// Number of partner slots a registrant can hold.
///
/// A registrant holding this many partners is fully assigned and must not be
/// offered another assignment round.
pub const MAX_SLOTS: usize = 2;
