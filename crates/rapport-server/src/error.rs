use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use rapport_core::EvaluationError;

use crate::wire::{ErrorBody, FieldError, ValidationErrorBody};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn error_body(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Evaluation(EvaluationError::Validation { field, message }) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorBody {
                    errors: vec![FieldError { field, message }],
                }),
            )
                .into_response(),
            ApiError::Evaluation(err @ EvaluationError::InvalidSubject) => {
                error_body(StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Evaluation(err @ EvaluationError::NotFound { .. }) => {
                error_body(StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Evaluation(EvaluationError::Storage(detail)) => {
                tracing::error!(%detail, "storage failure");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(message) => error_body(StatusCode::UNAUTHORIZED, message),
            ApiError::BadRequest(message) => error_body(StatusCode::BAD_REQUEST, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (
                ApiError::from(EvaluationError::validation("score", "too high")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(EvaluationError::InvalidSubject),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(EvaluationError::NotFound { kind: "user", id: 4 }),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(EvaluationError::storage("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Unauthorized("who?".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
