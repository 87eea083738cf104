//! HTTP server assembly for Sanya.
//!
//! Mounts the JSON API under `/api` with request tracing, and hosts the
//! configuration and import logic used by the `sanya-server` binary.

pub mod config;
pub mod import;

use axum::Router;
use sanya_api::{AppState, api_router};
use sanya_core::store::TableStore;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;

/// The complete application router.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: TableStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use sanya_api::SessionKeys;
  use sanya_store_csv::CsvStore;
  use tower::ServiceExt as _;

  use super::*;

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(
      Arc::new(CsvStore::new(dir.path())),
      SessionKeys::random(false),
    );

    let resp = app(state.clone())
      .oneshot(Request::get("/api/politicians").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app(state)
      .oneshot(Request::get("/politicians").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
