//! Signed session cookie and the extractors built on it.
//!
//! The cookie carries the whole [`Session`]: `base64url(json) "." hex(mac)`
//! where `mac` is HMAC-SHA256 of the encoded payload. No server-side session
//! table exists; a token is valid while its signature checks out and
//! `expiresAt` is in the future.

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand_core::{OsRng, RngCore};
use sanya_core::{
  store::TableStore,
  user::{SESSION_LIFETIME_HOURS, SafeUser, Session},
};
use sha2::Sha256;
use tower_cookies::{
  Cookie, Cookies,
  cookie::{SameSite, time::Duration},
};

use crate::{AppState, error::ApiError};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "auth_session";

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Signing secret plus cookie policy for this server instance.
#[derive(Clone)]
pub struct SessionKeys {
  secret: Vec<u8>,
  secure: bool,
}

impl SessionKeys {
  pub fn new(secret: impl Into<Vec<u8>>, secure: bool) -> Self {
    Self { secret: secret.into(), secure }
  }

  /// A fresh 32-byte secret; sessions do not survive a restart.
  pub fn random(secure: bool) -> Self {
    let mut secret = vec![0u8; 32];
    OsRng.fill_bytes(&mut secret);
    Self { secret, secure }
  }

  fn mac(&self) -> Result<HmacSha256, ApiError> {
    HmacSha256::new_from_slice(&self.secret)
      .map_err(|e| ApiError::Internal(format!("session key: {e}")))
  }

  pub fn sign(&self, session: &Session) -> Result<String, ApiError> {
    let json = serde_json::to_vec(session)
      .map_err(|e| ApiError::Internal(format!("session encoding: {e}")))?;
    let payload = B64.encode(json);
    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    let sig = hex::encode(mac.finalize().into_bytes());
    Ok(format!("{payload}.{sig}"))
  }

  /// The session in `token`, if the signature is good and it has not
  /// expired at `now`.
  pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
    let (payload, sig) = token.split_once('.')?;
    let sig = hex::decode(sig).ok()?;

    let mut mac = self.mac().ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&sig).ok()?;

    let json = B64.decode(payload).ok()?;
    let session: Session = serde_json::from_slice(&json).ok()?;
    session.is_valid_at(now).then_some(session)
  }

  /// The `Set-Cookie` value carrying `session`.
  pub fn cookie(&self, session: &Session) -> Result<Cookie<'static>, ApiError> {
    Ok(
      Cookie::build((SESSION_COOKIE, self.sign(session)?))
        .http_only(true)
        .secure(self.secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(SESSION_LIFETIME_HOURS))
        .path("/")
        .build(),
    )
  }

  /// Start a session for `user` and attach it to the response.
  pub fn issue(&self, cookies: &Cookies, user: SafeUser) -> Result<(), ApiError> {
    let session = Session::start(user, Utc::now());
    cookies.add(self.cookie(&session)?);
    Ok(())
  }

  pub fn clear(&self, cookies: &Cookies) {
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
  }
}

fn session_user<S>(parts: &Parts, state: &AppState<S>) -> Option<SafeUser> {
  let cookies = parts.extensions.get::<Cookies>()?;
  let token = cookies.get(SESSION_COOKIE)?;
  state.sessions.verify(token.value(), Utc::now()).map(|s| s.user)
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The signed-in user; 401 without a valid session.
pub struct CurrentUser(pub SafeUser);

/// A signed-in admin; 401 without a session, 403 for other roles.
pub struct AdminUser(pub SafeUser);

/// The signed-in user, if any. Never rejects.
pub struct MaybeUser(pub Option<SafeUser>);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: TableStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    session_user(parts, state).map(CurrentUser).ok_or(ApiError::Unauthorized)
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: TableStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let user = session_user(parts, state).ok_or(ApiError::Unauthorized)?;
    if !user.is_admin() {
      tracing::debug!(user = %user.username, "non-admin on admin route");
      return Err(ApiError::Forbidden);
    }
    Ok(AdminUser(user))
  }
}

impl<S> FromRequestParts<AppState<S>> for MaybeUser
where
  S: TableStore + 'static,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    Ok(MaybeUser(session_user(parts, state)))
  }
}

#[cfg(test)]
mod tests {
  use chrono::Duration as ChronoDuration;
  use sanya_core::user::Role;

  use super::*;

  fn user(role: Role) -> SafeUser {
    let at = Utc::now();
    SafeUser {
      id: "1".into(),
      username: "somsri".into(),
      role,
      email: None,
      created_at: at,
      updated_at: at,
    }
  }

  #[test]
  fn signed_token_verifies() {
    let keys = SessionKeys::new(b"secret".to_vec(), false);
    let session = Session::start(user(Role::Admin), Utc::now());
    let token = keys.sign(&session).unwrap();
    assert_eq!(keys.verify(&token, Utc::now()), Some(session));
  }

  #[test]
  fn tampered_token_is_rejected() {
    let keys = SessionKeys::new(b"secret".to_vec(), false);
    let token = keys.sign(&Session::start(user(Role::User), Utc::now())).unwrap();

    // Forge a payload claiming admin, keep the old signature.
    let (_, sig) = token.split_once('.').unwrap();
    let forged = Session::start(user(Role::Admin), Utc::now());
    let forged_payload = B64.encode(serde_json::to_vec(&forged).unwrap());
    assert_eq!(keys.verify(&format!("{forged_payload}.{sig}"), Utc::now()), None);

    let other = SessionKeys::new(b"other".to_vec(), false);
    assert_eq!(other.verify(&token, Utc::now()), None);
    assert_eq!(keys.verify("garbage", Utc::now()), None);
  }

  #[test]
  fn expired_token_is_rejected() {
    let keys = SessionKeys::random(false);
    let start = Utc::now();
    let token = keys.sign(&Session::start(user(Role::User), start)).unwrap();
    assert!(keys.verify(&token, start + ChronoDuration::hours(23)).is_some());
    assert!(keys.verify(&token, start + ChronoDuration::hours(24)).is_none());
  }

  #[test]
  fn cookie_attributes() {
    let keys = SessionKeys::random(true);
    let cookie = keys.cookie(&Session::start(user(Role::User), Utc::now())).unwrap();
    assert_eq!(cookie.name(), SESSION_COOKIE);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
  }
}
