use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use nong_model::RegistrantId;
use tracing::debug;

use crate::{error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build the router.
    ///
    /// Routes:
    /// - POST /api/v1/registrants/{id}/assign - Run an assignment round
    /// - GET /api/v1/registrants/{id} - Registrant record
    /// - GET /healthz - Liveness
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/registrants/{id}/assign", post(assign::<H>))
            .route("/api/v1/registrants/{id}", get(registrant::<H>))
            .route("/healthz", get(healthz))
            .with_state(self.handler)
    }
}

fn registrant_id(raw: String) -> Result<RegistrantId, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::InvalidRequest("registrant id cannot be empty".into()));
    }
    Ok(RegistrantId::from(raw))
}

/// POST /api/v1/registrants/{id}/assign
async fn assign<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let id = registrant_id(id)?;
    let assignment = handler.assign(&id).await?;
    debug!(registrant = %id, iteration = assignment.iteration, "assignment served");
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// GET /api/v1/registrants/{id}
async fn registrant<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let id = registrant_id(id)?;
    handler
        .registrant(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("registrant not found: {id}")))
}

async fn healthz() -> &'static str {
    "ok"
}
