use std::sync::Arc;

use async_trait::async_trait;
use nong_core::{AssignOutcome, Assigner, AssignmentStore};
use nong_model::RegistrantId;

use crate::{
    error::ApiError,
    handler::{ApiHandler, Assignment, RegistrantView},
};

/// [`ApiHandler`] that delegates to an [`Assigner`].
pub struct AssignerAdapter<S: ?Sized> {
    assigner: Arc<Assigner<S>>,
}

impl<S: AssignmentStore + ?Sized> AssignerAdapter<S> {
    pub fn new(assigner: Arc<Assigner<S>>) -> Self {
        Self { assigner }
    }
}

#[async_trait]
impl<S: AssignmentStore + ?Sized> ApiHandler for AssignerAdapter<S> {
    async fn assign(&self, id: &RegistrantId) -> Result<Assignment, ApiError> {
        match self.assigner.assign(id).await? {
            AssignOutcome::Assigned {
                iteration,
                partners,
            } => Ok(Assignment {
                iteration,
                partners,
            }),
            AssignOutcome::Exhausted { iterations } => Err(ApiError::IterationLimit { iterations }),
        }
    }

    async fn registrant(&self, id: &RegistrantId) -> Result<Option<RegistrantView>, ApiError> {
        let registrant = self
            .assigner
            .store()
            .fetch_registrant(id)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(registrant.map(RegistrantView::from))
    }
}
