//! Handlers for `/promises` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/promises` | `?sortBy=createdAt\|updatedAt\|promiseDate&order=asc\|desc&politicianId=&status=` |
//! | `POST`   | `/promises` | Admin |
//! | `GET`    | `/promises/{id}` | 404 if not found |
//! | `PUT`    | `/promises/{id}` | Admin. Partial body; advances `updatedAt` |
//! | `DELETE` | `/promises/{id}` | Admin |

use axum::extract::{Path, State};
use sanya_core::{
  promise::{NewPromise, PromisePatch, PromiseStatus},
  record::SortOrder,
  store::TableStore,
  tracker::{PromiseFilter, PromiseSortField, PromiseWithPolitician},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiQuery, Created, Data, Message},
  session::AdminUser,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  #[serde(default)]
  pub sort_by:       PromiseSortField,
  #[serde(default)]
  pub order:         SortOrder,
  pub politician_id: Option<String>,
  pub status:        Option<PromiseStatus>,
}

impl From<ListParams> for PromiseFilter {
  fn from(p: ListParams) -> Self {
    Self {
      sort_by:       p.sort_by,
      order:         p.order,
      politician_id: p.politician_id.filter(|id| !id.is_empty()),
      status:        p.status,
    }
  }
}

/// `GET /promises`
pub async fn list<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Data<Vec<PromiseWithPolitician>>, ApiError> {
  let filter = PromiseFilter::from(params);
  Ok(Data(state.tracker.list_promises(&filter).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /promises`
pub async fn create<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  ApiJson(body): ApiJson<NewPromise>,
) -> Result<Created<PromiseWithPolitician>, ApiError> {
  Ok(Created(state.tracker.create_promise(body).await?))
}

// ─── Get / update / delete ──────────────────────────────────────────────────

/// `GET /promises/{id}`
pub async fn get_one<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Data<PromiseWithPolitician>, ApiError> {
  state
    .tracker
    .promise_with_politician(&id)
    .await?
    .map(Data)
    .ok_or_else(|| ApiError::NotFound("Promise not found".into()))
}

/// `PUT /promises/{id}`
pub async fn update<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
  ApiJson(patch): ApiJson<PromisePatch>,
) -> Result<Data<PromiseWithPolitician>, ApiError> {
  Ok(Data(state.tracker.update_promise(&id, patch).await?))
}

/// `DELETE /promises/{id}`
pub async fn delete<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
) -> Result<Message, ApiError> {
  if !state.tracker.delete_promise(&id).await? {
    return Err(ApiError::NotFound("Promise not found".into()));
  }
  Ok(Message("Promise deleted successfully"))
}
