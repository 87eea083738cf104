//! Handlers for `/politicians` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/politicians` | Each with the area of their latest campaign |
//! | `POST`   | `/politicians` | Admin. Body: `{"name","partyName","portraitUrl"?}` |
//! | `GET`    | `/politicians/{id}` | 404 if not found |
//! | `PUT`    | `/politicians/{id}` | Admin. Partial body |
//! | `DELETE` | `/politicians/{id}` | Admin. Campaigns and promises are kept |
//! | `GET`    | `/politicians/{id}/promises` | |
//! | `GET`    | `/politicians/{id}/campaigns` | Newest first |
//! | `POST`   | `/politicians/{id}/campaigns` | Admin. Body: `{"year","areaName"}` |

use axum::extract::{Path, State};
use sanya_core::{
  politician::{Campaign, NewCampaign, NewPolitician, Politician, PoliticianPatch},
  store::TableStore,
  tracker::{PoliticianWithArea, PoliticianWithPromises},
};

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, Created, Data, Message},
  session::AdminUser,
};

/// `GET /politicians`
pub async fn list<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Data<Vec<PoliticianWithArea>>, ApiError> {
  Ok(Data(state.tracker.politicians_with_area().await?))
}

/// `POST /politicians`
pub async fn create<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  ApiJson(body): ApiJson<NewPolitician>,
) -> Result<Created<Politician>, ApiError> {
  Ok(Created(state.tracker.create_politician(body).await?))
}

/// `GET /politicians/{id}`
pub async fn get_one<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Data<PoliticianWithArea>, ApiError> {
  Ok(Data(state.tracker.politician_with_area(&id).await?))
}

/// `PUT /politicians/{id}`
pub async fn update<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
  ApiJson(patch): ApiJson<PoliticianPatch>,
) -> Result<Data<Politician>, ApiError> {
  Ok(Data(state.tracker.update_politician(&id, patch).await?))
}

/// `DELETE /politicians/{id}`
pub async fn delete<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
) -> Result<Message, ApiError> {
  if !state.tracker.delete_politician(&id).await? {
    return Err(ApiError::NotFound("Politician not found".into()));
  }
  Ok(Message("Politician deleted successfully"))
}

/// `GET /politicians/{id}/promises`
pub async fn promises<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Data<PoliticianWithPromises>, ApiError> {
  Ok(Data(state.tracker.politician_with_promises(&id).await?))
}

/// `GET /politicians/{id}/campaigns`
pub async fn campaigns<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Data<Vec<Campaign>>, ApiError> {
  Ok(Data(state.tracker.campaigns_for(&id).await?))
}

/// `POST /politicians/{id}/campaigns`
pub async fn create_campaign<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<NewCampaign>,
) -> Result<Created<Campaign>, ApiError> {
  Ok(Created(state.tracker.create_campaign(&id, body).await?))
}
