//! Request extractors and the success envelope.
//!
//! Every body the API produces is either `{"success": true, "data": ...}`,
//! `{"success": true, "message": ...}` or, via [`crate::ApiError`],
//! `{"success": false, "error": ...}`.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Query},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// [`axum::Json`] whose rejection is an enveloped 400.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// [`axum::extract::Query`] whose rejection is an enveloped 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct DataBody<T> {
  success: bool,
  data:    T,
}

#[derive(Serialize)]
struct MessageBody {
  success: bool,
  message: &'static str,
}

/// `200 {"success": true, "data": ...}`
pub struct Data<T>(pub T);

impl<T: Serialize> IntoResponse for Data<T> {
  fn into_response(self) -> Response {
    Json(DataBody { success: true, data: self.0 }).into_response()
  }
}

/// `201 {"success": true, "data": ...}`
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
  fn into_response(self) -> Response {
    (StatusCode::CREATED, Data(self.0)).into_response()
  }
}

/// `200 {"success": true, "message": ...}`
pub struct Message(pub &'static str);

impl IntoResponse for Message {
  fn into_response(self) -> Response {
    Json(MessageBody { success: true, message: self.0 }).into_response()
  }
}
