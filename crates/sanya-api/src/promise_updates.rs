//! Handlers for `/promise-updates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/promise-updates?promiseId=` | History of one promise, newest first |
//! | `GET`  | `/promise-updates` | Admin. Every update, newest first |
//! | `POST` | `/promise-updates` | Admin. Also moves the promise to `newStatus` |

use axum::extract::State;
use sanya_core::{
  promise::{NewPromiseUpdate, PromiseUpdate},
  record::{SortOrder, sort_by_field},
  store::TableStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiQuery, Created, Data},
  session::{AdminUser, MaybeUser},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub promise_id: Option<String>,
}

/// `GET /promise-updates[?promiseId=<id>]`
pub async fn list<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Data<Vec<PromiseUpdate>>, ApiError> {
  if let Some(promise_id) = params.promise_id.filter(|id| !id.is_empty()) {
    let mut updates = state.tracker.promise_updates_for(&promise_id).await?;
    sort_by_field(&mut updates, "update_date", SortOrder::Desc)?;
    return Ok(Data(updates));
  }

  match caller {
    None => Err(ApiError::Unauthorized),
    Some(user) if !user.is_admin() => Err(ApiError::Forbidden),
    Some(_) => Ok(Data(state.tracker.all_promise_updates().await?)),
  }
}

/// `POST /promise-updates`
pub async fn create<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  ApiJson(body): ApiJson<NewPromiseUpdate>,
) -> Result<Created<PromiseUpdate>, ApiError> {
  Ok(Created(state.tracker.create_promise_update(body).await?))
}
