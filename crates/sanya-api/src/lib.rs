//! JSON REST API for Sanya.
//!
//! Exposes an axum [`Router`] backed by any [`sanya_core::store::TableStore`].
//! Sessions travel in a signed `auth_session` cookie; TLS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sanya_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod extract;
pub mod politicians;
pub mod promise_updates;
pub mod promises;
pub mod session;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use sanya_core::{accounts::Accounts, store::TableStore, tracker::Tracker};
use tower_cookies::CookieManagerLayer;

pub use error::ApiError;
pub use session::SessionKeys;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub tracker:  Arc<Tracker<S>>,
  pub accounts: Arc<Accounts<S>>,
  pub sessions: Arc<SessionKeys>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      tracker:  Arc::clone(&self.tracker),
      accounts: Arc::clone(&self.accounts),
      sessions: Arc::clone(&self.sessions),
    }
  }
}

impl<S: TableStore> AppState<S> {
  pub fn new(store: Arc<S>, sessions: SessionKeys) -> Self {
    Self {
      tracker:  Arc::new(Tracker::new(Arc::clone(&store))),
      accounts: Arc::new(Accounts::new(store)),
      sessions: Arc::new(sessions),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: TableStore + 'static,
{
  Router::new()
    // Auth
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/logout", post(auth::logout::<S>))
    .route("/auth/me", get(auth::me))
    // Politicians
    .route(
      "/politicians",
      get(politicians::list::<S>).post(politicians::create::<S>),
    )
    .route(
      "/politicians/{id}",
      get(politicians::get_one::<S>)
        .put(politicians::update::<S>)
        .delete(politicians::delete::<S>),
    )
    .route("/politicians/{id}/promises", get(politicians::promises::<S>))
    .route(
      "/politicians/{id}/campaigns",
      get(politicians::campaigns::<S>).post(politicians::create_campaign::<S>),
    )
    // Promises
    .route("/promises", get(promises::list::<S>).post(promises::create::<S>))
    .route(
      "/promises/{id}",
      get(promises::get_one::<S>)
        .put(promises::update::<S>)
        .delete(promises::delete::<S>),
    )
    // Promise updates
    .route(
      "/promise-updates",
      get(promise_updates::list::<S>).post(promise_updates::create::<S>),
    )
    // Users
    .route("/users", get(users::list::<S>))
    .route("/users/{id}", get(users::get_one::<S>).delete(users::delete::<S>))
    .layer(CookieManagerLayer::new())
    .with_state(state)
}

#[cfg(test)]
mod tests;
