use serde::{Deserialize, Serialize};

/// Number of partners granted to a registrant in one assignment round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quota {
    One,
    Two,
}

impl Quota {
    /// Number of partners this quota stands for.
    #[inline]
    pub fn count(&self) -> usize {
        match self {
            Quota::One => 1,
            Quota::Two => 2,
        }
    }

    /// Limit the quota to `available` slots.
    ///
    /// Returns `None` when nothing can be granted at all.
    pub fn clamp_to(self, available: usize) -> Option<Quota> {
        match (self, available) {
            (_, 0) => None,
            (Quota::Two, 1) => Some(Quota::One),
            (quota, _) => Some(quota),
        }
    }
}
