//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Not authenticated")]
  Unauthorized,

  #[error("Admin access required")]
  Forbidden,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] sanya_core::Error),

  #[error("internal error: {0}")]
  Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
  success: bool,
  error:   String,
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use sanya_core::Error as Core;
    match self {
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Forbidden => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Core(Core::NotFound { .. }) => StatusCode::NOT_FOUND,
      Self::Core(Core::InvalidCredentials) => StatusCode::UNAUTHORIZED,
      Self::Core(e) if e.is_validation() => StatusCode::BAD_REQUEST,
      Self::Core(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let body = ErrorBody { success: false, error: self.to_string() };
    (status, Json(body)).into_response()
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}
