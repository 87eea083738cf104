//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"username","password"}`; sets the session cookie |
//! | `POST` | `/auth/register` | Body: `{"username","password","role"?,"email"?}`; signs the new user in |
//! | `POST` | `/auth/logout` | Clears the session cookie |
//! | `GET`  | `/auth/me` | 401 without a session |

use axum::extract::State;
use sanya_core::{
  store::TableStore,
  user::{NewUser, SafeUser},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, Created, Data, Message},
  session::{CurrentUser, MaybeUser},
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  cookies: Cookies,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<Data<SafeUser>, ApiError> {
  let user = state.accounts.login(&body.username, &body.password).await?;
  state.sessions.issue(&cookies, user.clone())?;
  tracing::info!(id = %user.id, "signed in");
  Ok(Data(user))
}

/// `POST /auth/register`
///
/// A requested `role` is only honoured when an admin is signed in; everyone
/// else registers as a plain user. The caller's own session is replaced by
/// one for the new account unless the caller is an admin creating users.
pub async fn register<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  MaybeUser(caller): MaybeUser,
  cookies: Cookies,
  ApiJson(mut body): ApiJson<NewUser>,
) -> Result<Created<SafeUser>, ApiError> {
  let by_admin = caller.as_ref().is_some_and(|u| u.is_admin());
  if !by_admin {
    body.role = None;
  }
  let user = state.accounts.register(body).await?;
  if !by_admin {
    state.sessions.issue(&cookies, user.clone())?;
  }
  Ok(Created(user))
}

/// `POST /auth/logout`
pub async fn logout<S: TableStore + 'static>(
  State(state): State<AppState<S>>,
  cookies: Cookies,
) -> Message {
  state.sessions.clear(&cookies);
  Message("Logged out successfully")
}

/// `GET /auth/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Data<SafeUser> {
  Data(user)
}
