//! Runtime server configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use sanya_api::SessionKeys;
use serde::Deserialize;

/// Deserialised from an optional TOML file layered under `SANYA_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  /// Directory holding the table files. A leading `~/` is expanded.
  pub data_dir:       PathBuf,
  /// HMAC secret for session cookies. Random per process when unset.
  pub session_secret: Option<String>,
  /// Mark the session cookie `Secure` (serve behind HTTPS).
  pub secure_cookies: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "127.0.0.1".to_string(),
      port:           3000,
      data_dir:       PathBuf::from("data"),
      session_secret: None,
      secure_cookies: false,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("SANYA"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn data_dir(&self) -> PathBuf { expand_tilde(&self.data_dir) }

  pub fn session_keys(&self) -> SessionKeys {
    match self.session_secret.as_deref().filter(|s| !s.is_empty()) {
      Some(secret) => SessionKeys::new(secret.as_bytes().to_vec(), self.secure_cookies),
      None => {
        tracing::warn!("no session_secret configured; sessions end when the process exits");
        SessionKeys::random(self.secure_cookies)
      }
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
