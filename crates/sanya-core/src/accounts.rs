//! Registration, login and user administration ([`Accounts`]).

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{
  Error, Result,
  error::require,
  record::now,
  store::{Repository, TableStore},
  user::{NewUser, Role, SafeUser, User},
};

pub const MIN_PASSWORD_LEN: usize = 4;

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

enum Verdict {
  Match,
  /// Matched a stored cleartext password; the row should be re-hashed.
  LegacyMatch,
  Mismatch,
}

fn verify_password(stored: &str, candidate: &str) -> Verdict {
  match PasswordHash::new(stored) {
    Ok(parsed) => match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
      Ok(()) => Verdict::Match,
      Err(_) => Verdict::Mismatch,
    },
    Err(_) if !stored.is_empty() && stored == candidate => Verdict::LegacyMatch,
    Err(_) => Verdict::Mismatch,
  }
}

pub struct Accounts<S> {
  users: Repository<User, S>,
}

impl<S: TableStore> Accounts<S> {
  pub fn new(store: Arc<S>) -> Self { Self { users: Repository::new(store) } }

  /// Check credentials. Unknown users and wrong passwords both fail with
  /// [`Error::InvalidCredentials`].
  pub async fn login(&self, username: &str, password: &str) -> Result<SafeUser> {
    require(&[("username", username), ("password", password)])?;

    let Some(mut user) = self.find_by_username(username).await? else {
      tracing::debug!(%username, "login for unknown user");
      return Err(Error::InvalidCredentials);
    };

    match verify_password(&user.password, password) {
      Verdict::Match => {}
      Verdict::LegacyMatch => {
        user.password = hash_password(password)?;
        user.updated_at = now();
        user = self.users.save(user).await?;
        tracing::info!(id = %user.id, "upgraded cleartext password to argon2");
      }
      Verdict::Mismatch => {
        tracing::debug!(%username, "login with wrong password");
        return Err(Error::InvalidCredentials);
      }
    }

    Ok(user.to_safe())
  }

  /// Create an account. The role defaults to [`Role::User`].
  pub async fn register(&self, input: NewUser) -> Result<SafeUser> {
    require(&[("username", &input.username), ("password", &input.password)])?;

    if self.find_by_username(&input.username).await?.is_some() {
      return Err(Error::UsernameTaken);
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::PasswordTooShort { min: MIN_PASSWORD_LEN });
    }

    let at = now();
    let user = self
      .users
      .save(User {
        id:         String::new(),
        username:   input.username,
        password:   hash_password(&input.password)?,
        role:       input.role.unwrap_or_default(),
        email:      input.email.filter(|e| !e.is_empty()),
        created_at: at,
        updated_at: at,
      })
      .await?;

    tracing::info!(id = %user.id, username = %user.username, role = %user.role, "user registered");
    Ok(user.to_safe())
  }

  pub async fn create_admin(&self, username: &str, password: &str) -> Result<SafeUser> {
    self
      .register(NewUser {
        username: username.to_owned(),
        password: password.to_owned(),
        role:     Some(Role::Admin),
        email:    None,
      })
      .await
  }

  pub async fn user_by_id(&self, id: &str) -> Result<Option<SafeUser>> {
    Ok(self.users.find_by_id(id).await?.map(|u| u.to_safe()))
  }

  pub async fn all_users(&self) -> Result<Vec<SafeUser>> {
    Ok(self.users.find_all().await?.iter().map(User::to_safe).collect())
  }

  pub async fn delete_user(&self, id: &str) -> Result<bool> {
    self.users.delete(id).await
  }

  /// Exact, case-sensitive match; the first matching row wins.
  pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
    Ok(
      self
        .users
        .find_all()
        .await?
        .into_iter()
        .find(|u| u.username == username),
    )
  }
}
