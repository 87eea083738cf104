//! Users, their safe (password-free) view, and session claims.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  record::{Record, Row, TableDef, decode_ts, encode_ts, expect_len},
};

/// Fixed lifetime of a login session, in hours.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "user" => Ok(Self::User),
      "admin" => Ok(Self::Admin),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A stored account. `password` holds an argon2 PHC string; never serialise
/// this type to clients, use [`SafeUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub id:         String,
  pub username:   String,
  pub password:   String,
  pub role:       Role,
  pub email:      Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn to_safe(&self) -> SafeUser {
    SafeUser {
      id:         self.id.clone(),
      username:   self.username.clone(),
      role:       self.role,
      email:      self.email.clone(),
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

impl Record for User {
  const TABLE: TableDef = TableDef {
    entity:  "user",
    file:    "users.csv",
    headers: &[
      "id",
      "username",
      "password",
      "role",
      "email",
      "createdAt",
      "updatedAt",
    ],
  };

  fn id(&self) -> &str { &self.id }

  fn set_id(&mut self, id: String) { self.id = id; }

  fn to_row(&self) -> Row {
    vec![
      self.id.clone(),
      self.username.clone(),
      self.password.clone(),
      self.role.as_str().to_owned(),
      self.email.clone().unwrap_or_default(),
      encode_ts(self.created_at),
      encode_ts(self.updated_at),
    ]
  }

  fn from_row(row: &[String]) -> Result<Self> {
    let t = &Self::TABLE;
    expect_len(t, row, 7)?;
    Ok(Self {
      id:         row[0].clone(),
      username:   row[1].clone(),
      password:   row[2].clone(),
      role:       row[3].parse()?,
      email:      Some(row[4].clone()).filter(|e| !e.is_empty()),
      created_at: decode_ts(t, "createdAt", &row[5])?,
      updated_at: decode_ts(t, "updatedAt", &row[6])?,
    })
  }
}

/// A user with the password omitted; the only user shape that leaves the
/// core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
  pub id:         String,
  pub username:   String,
  pub role:       Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:      Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl SafeUser {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

/// Input to [`crate::accounts::Accounts::register`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  pub role:     Option<Role>,
  pub email:    Option<String>,
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The authenticated-identity claim attached to a browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub user:       SafeUser,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  /// Start a session at `now` lasting [`SESSION_LIFETIME_HOURS`].
  pub fn start(user: SafeUser, now: DateTime<Utc>) -> Self {
    Self {
      user,
      expires_at: now + Duration::hours(SESSION_LIFETIME_HOURS),
    }
  }

  /// Valid strictly before `expires_at`.
  pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool { now < self.expires_at }
}
