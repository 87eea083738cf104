//! Handlers for `/users` endpoints. All require an admin session.

use axum::extract::{Path, State};
use sanya_core::{store::TableStore, user::SafeUser};

use crate::{
  AppState,
  error::ApiError,
  extract::{Data, Message},
  session::AdminUser,
};

/// `GET /users`
pub async fn list<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Data<Vec<SafeUser>>, ApiError> {
  Ok(Data(state.accounts.all_users().await?))
}

/// `GET /users/{id}`
pub async fn get_one<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
) -> Result<Data<SafeUser>, ApiError> {
  state
    .accounts
    .user_by_id(&id)
    .await?
    .map(Data)
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// `DELETE /users/{id}`
pub async fn delete<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  AdminUser(admin): AdminUser,
  Path(id): Path<String>,
) -> Result<Message, ApiError> {
  if !state.accounts.delete_user(&id).await? {
    return Err(ApiError::NotFound("User not found".into()));
  }
  tracing::info!(%id, by = %admin.id, "user deleted");
  Ok(Message("User deleted successfully"))
}
