use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use nong_core::{AssignError, ErrorKind};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("reached iteration limit")]
    IterationLimit { iterations: u32 },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::IterationLimit { .. } | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable class echoed in the body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::IterationLimit { .. } => "iteration_limit",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<AssignError> for ApiError {
    fn from(err: AssignError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::Conflict => ApiError::Conflict(message),
            ErrorKind::Unavailable => ApiError::Unavailable(message),
            ErrorKind::Computation | ErrorKind::Internal => ApiError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use nong_core::{AssignPhase, QuotaError, StoreError};
    use nong_model::RegistrantId;

    use super::*;

    #[test]
    fn assign_errors_map_onto_statuses() {
        let id = RegistrantId::from("s-1");
        let cases = [
            (AssignError::NotFound(id.clone()), StatusCode::NOT_FOUND),
            (AssignError::AlreadyAssigned(id), StatusCode::CONFLICT),
            (AssignError::PoolExhausted, StatusCode::SERVICE_UNAVAILABLE),
            (
                AssignError::Computation(QuotaError::MissingStatistics),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AssignError::Storage {
                    phase: AssignPhase::PersistAttempt,
                    source: StoreError::Backend("disk".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn iteration_limit_has_fixed_message() {
        let err = ApiError::IterationLimit { iterations: 100 };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "reached iteration limit");
        assert_eq!(err.kind(), "iteration_limit");
    }
}
