//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Domain errors pass through untouched and are mapped to a status code by
//! their kind; the response body always carries the stable kind string so
//! clients never parse prose.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use slate_core::Error as DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing, malformed, tampered, or expired bearer token.
  #[error("unauthorized")]
  Unauthorized,

  /// The request payload failed boundary validation.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] DomainError),
}

fn domain_status(err: &DomainError) -> StatusCode {
  match err {
    DomainError::UsernameInUse(_)
    | DomainError::SubjectAlreadyExists(_)
    | DomainError::ScheduleNameInUse(_)
    | DomainError::SubjectAlreadyInSchedule(_)
    | DomainError::ConflictsFound(_) => StatusCode::CONFLICT,

    DomainError::UserNotFound
    | DomainError::SubjectNotFound
    | DomainError::ScheduleNotFound(_)
    | DomainError::SubjectNotInSchedule(_) => StatusCode::NOT_FOUND,

    DomainError::IncorrectPassword => StatusCode::UNAUTHORIZED,
    DomainError::NoChange => StatusCode::BAD_REQUEST,
    DomainError::NotAuthorized => StatusCode::FORBIDDEN,

    DomainError::Credential(_) | DomainError::Store(_) => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "UNAUTHORIZED" })),
      )
        .into_response(),

      ApiError::BadRequest(message) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "BAD_REQUEST", "message": message })),
      )
        .into_response(),

      ApiError::Domain(err) => {
        let status = domain_status(&err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
          tracing::error!(error = %err, "internal error");
          // Internals stay out of the response body.
          return (status, Json(json!({ "error": err.kind() })))
            .into_response();
        }

        let body = match &err {
          DomainError::ConflictsFound(conflicts) => {
            json!({ "error": err.kind(), "conflicts": conflicts })
          }
          other => json!({ "error": other.kind() }),
        };
        (status, Json(body)).into_response()
      }
    }
  }
}
