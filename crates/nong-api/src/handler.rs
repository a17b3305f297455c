use async_trait::async_trait;
use nong_model::{PartnerId, Preference, Registrant, RegistrantId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Body of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// 0-based iteration at which the persist committed.
    pub iteration: u32,
    pub partners: Vec<PartnerId>,
}

/// Public view of a registrant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantView {
    pub id: RegistrantId,
    pub preference: Preference,
    pub partners: Vec<PartnerId>,
    pub fully_assigned: bool,
}

impl From<Registrant> for RegistrantView {
    fn from(r: Registrant) -> Self {
        Self {
            partners: r.partners().cloned().collect(),
            fully_assigned: r.is_fully_assigned(),
            id: r.id,
            preference: r.preference,
        }
    }
}

/// Backend of the HTTP routes.
///
/// Wrap [`crate::AssignerAdapter`] to add cross-cutting logic such as
/// authentication or rate limiting.
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Run one assignment round for `id`.
    async fn assign(&self, id: &RegistrantId) -> Result<Assignment, ApiError>;

    /// Look up a registrant; `None` when unknown.
    async fn registrant(&self, id: &RegistrantId) -> Result<Option<RegistrantView>, ApiError>;
}
