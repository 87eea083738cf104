//! Error types for `sanya-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  // ── Not found ─────────────────────────────────────────────────────────

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  // ── Validation ────────────────────────────────────────────────────────

  #[error("Missing required fields: {}", .0.join(", "))]
  MissingFields(Vec<&'static str>),

  #[error("invalid {field}: {reason}")]
  InvalidField { field: &'static str, reason: String },

  #[error("username already exists")]
  UsernameTaken,

  #[error("password must be at least {min} characters")]
  PasswordTooShort { min: usize },

  /// Deliberately identical for unknown users and wrong passwords.
  #[error("invalid username or password")]
  InvalidCredentials,

  // ── Storage / decoding ────────────────────────────────────────────────

  #[error("malformed row in {table}: {reason}")]
  MalformedRow { table: &'static str, reason: String },

  #[error("unknown promise status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("unknown field {field:?} for {table}")]
  UnknownField { table: &'static str, field: String },

  #[error("id space exhausted for {0}")]
  IdSpaceExhausted(&'static str),

  #[error("record for {0} has no id")]
  MissingId(&'static str),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
    Self::NotFound { entity, id: id.into() }
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// `true` for caller mistakes (bad input, duplicate username, bad login).
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::MissingFields(_)
        | Self::InvalidField { .. }
        | Self::UsernameTaken
        | Self::PasswordTooShort { .. }
        | Self::InvalidCredentials
    )
  }
}

/// Fail with [`Error::MissingFields`] naming every blank field, in order.
pub(crate) fn require(fields: &[(&'static str, &str)]) -> Result<()> {
  let missing: Vec<&'static str> = fields
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| *name)
    .collect();
  if missing.is_empty() { Ok(()) } else { Err(Error::MissingFields(missing)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
