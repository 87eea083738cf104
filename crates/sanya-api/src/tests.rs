//! Router tests against a `CsvStore` in a temporary directory.

use std::sync::Arc;

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use sanya_store_csv::CsvStore;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{AppState, SessionKeys, api_router, session::SESSION_COOKIE};

struct TestApp {
  _dir:  TempDir,
  state: AppState<CsvStore>,
}

struct Reply {
  status: StatusCode,
  cookie: Option<String>,
  body:   Value,
}

async fn app() -> TestApp {
  let dir = tempfile::tempdir().expect("temp dir");
  let store = Arc::new(CsvStore::new(dir.path()));
  let state = AppState::new(store, SessionKeys::new(b"test-secret".to_vec(), false));
  state
    .accounts
    .create_admin("admin", "admin1234")
    .await
    .expect("seed admin");
  TestApp { _dir: dir, state }
}

async fn send(
  app: &TestApp,
  method: &str,
  uri: &str,
  cookie: Option<&str>,
  body: Option<Value>,
) -> Reply {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(c) = cookie {
    builder = builder.header(header::COOKIE, c);
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(app.state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();

  let status = resp.status();
  let cookie = resp
    .headers()
    .get(header::SET_COOKIE)
    .map(|v| v.to_str().unwrap().to_owned());
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  Reply { status, cookie, body }
}

/// `name=value` of a `Set-Cookie` header, ready for a `Cookie` header.
fn cookie_pair(set_cookie: &str) -> String {
  set_cookie.split(';').next().unwrap().to_owned()
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
  let reply = send(
    app,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "username": username, "password": password })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
  cookie_pair(&reply.cookie.expect("session cookie"))
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_sets_cookie_and_me_returns_safe_user() {
  let app = app().await;
  let reply = send(
    &app,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "username": "admin", "password": "admin1234" })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.body["success"], true);
  assert!(reply.body["data"].get("password").is_none());

  let set_cookie = reply.cookie.unwrap();
  assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE}=")));
  assert!(set_cookie.contains("HttpOnly"));
  assert!(set_cookie.contains("SameSite=Lax"));
  assert!(set_cookie.contains("Max-Age=86400"));

  let me = send(&app, "GET", "/auth/me", Some(&cookie_pair(&set_cookie)), None).await;
  assert_eq!(me.status, StatusCode::OK);
  assert_eq!(me.body["data"]["username"], "admin");
  assert_eq!(me.body["data"]["role"], "admin");
}

#[tokio::test]
async fn bad_login_is_generic_401() {
  let app = app().await;
  for (user, pass) in [("admin", "wrong"), ("ghost", "admin1234")] {
    let reply = send(
      &app,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": user, "password": pass })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["success"], false);
    assert_eq!(reply.body["error"], "invalid username or password");
    assert!(reply.cookie.is_none());
  }
}

#[tokio::test]
async fn me_without_or_with_tampered_cookie_is_401() {
  let app = app().await;
  assert_eq!(send(&app, "GET", "/auth/me", None, None).await.status, StatusCode::UNAUTHORIZED);

  let cookie = login(&app, "admin", "admin1234").await;
  let tampered = format!("{cookie}00");
  let reply = send(&app, "GET", "/auth/me", Some(&tampered), None).await;
  assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
  assert_eq!(reply.body["error"], "Not authenticated");
}

#[tokio::test]
async fn register_ignores_role_unless_admin() {
  let app = app().await;
  let reply = send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "username": "mallory", "password": "secret", "role": "admin" })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CREATED);
  assert_eq!(reply.body["data"]["role"], "user");
  assert!(reply.cookie.is_some());

  let admin = login(&app, "admin", "admin1234").await;
  let reply = send(
    &app,
    "POST",
    "/auth/register",
    Some(&admin),
    Some(json!({ "username": "editor", "password": "secret", "role": "admin" })),
  )
  .await;
  assert_eq!(reply.status, StatusCode::CREATED);
  assert_eq!(reply.body["data"]["role"], "admin");
}

#[tokio::test]
async fn register_validation_errors_are_400() {
  let app = app().await;
  let taken = send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "username": "admin", "password": "whatever" })),
  )
  .await;
  assert_eq!(taken.status, StatusCode::BAD_REQUEST);
  assert_eq!(taken.body["error"], "username already exists");

  let short = send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "username": "somsri", "password": "abc" })),
  )
  .await;
  assert_eq!(short.status, StatusCode::BAD_REQUEST);
  assert_eq!(short.body["error"], "password must be at least 4 characters");
}

#[tokio::test]
async fn logout_expires_cookie() {
  let app = app().await;
  let cookie = login(&app, "admin", "admin1234").await;
  let reply = send(&app, "POST", "/auth/logout", Some(&cookie), None).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.body["message"], "Logged out successfully");
  let removal = reply.cookie.unwrap();
  assert!(removal.starts_with(&format!("{SESSION_COOKIE}=")));
  assert!(removal.contains("Max-Age=0"));
}

// ─── Authorisation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn mutations_need_admin() {
  let app = app().await;
  let body = json!({ "name": "A", "partyName": "P" });

  let anon = send(&app, "POST", "/politicians", None, Some(body.clone())).await;
  assert_eq!(anon.status, StatusCode::UNAUTHORIZED);
  assert_eq!(anon.body["success"], false);

  send(
    &app,
    "POST",
    "/auth/register",
    None,
    Some(json!({ "username": "somsri", "password": "secret" })),
  )
  .await;
  let user = login(&app, "somsri", "secret").await;
  let forbidden = send(&app, "POST", "/politicians", Some(&user), Some(body.clone())).await;
  assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

  let users = send(&app, "GET", "/users", Some(&user), None).await;
  assert_eq!(users.status, StatusCode::FORBIDDEN);

  let all_updates = send(&app, "GET", "/promise-updates", None, None).await;
  assert_eq!(all_updates.status, StatusCode::UNAUTHORIZED);
}

// ─── Promise flow ────────────────────────────────────────────────────────────

#[tokio::test]
async fn promise_lifecycle_through_the_api() {
  let app = app().await;
  let admin = login(&app, "admin", "admin1234").await;

  let pol = send(
    &app,
    "POST",
    "/politicians",
    Some(&admin),
    Some(json!({ "name": "Somchai", "partyName": "พรรคตัวอย่าง" })),
  )
  .await;
  assert_eq!(pol.status, StatusCode::CREATED);
  assert_eq!(pol.body["data"]["id"], "10000001");

  let campaign = send(
    &app,
    "POST",
    "/politicians/10000001/campaigns",
    Some(&admin),
    Some(json!({ "year": 2023, "areaName": "Bangkok 1" })),
  )
  .await;
  assert_eq!(campaign.status, StatusCode::CREATED);

  let listed = send(&app, "GET", "/politicians", None, None).await;
  assert_eq!(listed.body["data"][0]["area"], "Bangkok 1");

  let promise = send(
    &app,
    "POST",
    "/promises",
    Some(&admin),
    Some(json!({
      "politicianId": "10000001",
      "name": "Build hospital",
      "details": "200 beds",
      "promiseDate": "2024-01-01"
    })),
  )
  .await;
  assert_eq!(promise.status, StatusCode::CREATED);
  assert_eq!(promise.body["data"]["id"], "1");
  assert_eq!(promise.body["data"]["status"], "ยังไม่เริ่ม");
  assert_eq!(promise.body["data"]["politicianName"], "Somchai");
  assert_eq!(promise.body["data"]["createdAt"], promise.body["data"]["updatedAt"]);

  let update = send(
    &app,
    "POST",
    "/promise-updates",
    Some(&admin),
    Some(json!({ "promiseId": "1", "details": "groundbreaking", "newStatus": "in-progress" })),
  )
  .await;
  assert_eq!(update.status, StatusCode::CREATED);
  assert_eq!(update.body["data"]["newStatus"], "กำลังดำเนินการ");

  let after = send(&app, "GET", "/promises/1", None, None).await;
  assert_eq!(after.body["data"]["status"], "กำลังดำเนินการ");
  assert_ne!(after.body["data"]["updatedAt"], after.body["data"]["createdAt"]);

  let history = send(&app, "GET", "/promise-updates?promiseId=1", None, None).await;
  assert_eq!(history.status, StatusCode::OK);
  assert_eq!(history.body["data"].as_array().unwrap().len(), 1);

  let by_status = send(
    &app,
    "GET",
    "/promises?status=in-progress&sortBy=updatedAt&order=asc",
    None,
    None,
  )
  .await;
  assert_eq!(by_status.body["data"].as_array().unwrap().len(), 1);

  let politician = send(&app, "GET", "/politicians/10000001/promises", None, None).await;
  assert_eq!(politician.body["data"]["promises"].as_array().unwrap().len(), 1);

  let deleted = send(&app, "DELETE", "/promises/1", Some(&admin), None).await;
  assert_eq!(deleted.status, StatusCode::OK);
  assert_eq!(deleted.body["message"], "Promise deleted successfully");
  let gone = send(&app, "GET", "/promises/1", None, None).await;
  assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_input_gets_enveloped_400() {
  let app = app().await;
  let admin = login(&app, "admin", "admin1234").await;

  let missing = send(
    &app,
    "POST",
    "/promises",
    Some(&admin),
    Some(json!({ "name": "x" })),
  )
  .await;
  assert_eq!(missing.status, StatusCode::BAD_REQUEST);
  assert_eq!(
    missing.body["error"],
    "Missing required fields: politicianId, details, promiseDate"
  );

  let bad_status = send(
    &app,
    "POST",
    "/promise-updates",
    Some(&admin),
    Some(json!({ "promiseId": "1", "details": "x", "newStatus": "done" })),
  )
  .await;
  assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);
  assert_eq!(bad_status.body["success"], false);

  let no_status = send(
    &app,
    "POST",
    "/promise-updates",
    Some(&admin),
    Some(json!({ "promiseId": "1", "details": "x" })),
  )
  .await;
  assert_eq!(no_status.status, StatusCode::BAD_REQUEST);
  assert_eq!(no_status.body["error"], "Missing required fields: newStatus");

  let bad_sort = send(&app, "GET", "/promises?sortBy=name", None, None).await;
  assert_eq!(bad_sort.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_ids_are_404() {
  let app = app().await;
  let admin = login(&app, "admin", "admin1234").await;

  for uri in ["/politicians/10000099", "/promises/99", "/politicians/10000099/promises"] {
    let reply = send(&app, "GET", uri, None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
    assert_eq!(reply.body["success"], false);
  }

  let update = send(
    &app,
    "POST",
    "/promise-updates",
    Some(&admin),
    Some(json!({ "promiseId": "99", "details": "x", "newStatus": "broken" })),
  )
  .await;
  assert_eq!(update.status, StatusCode::NOT_FOUND);

  let user = send(&app, "DELETE", "/users/99", Some(&admin), None).await;
  assert_eq!(user.status, StatusCode::NOT_FOUND);
}
