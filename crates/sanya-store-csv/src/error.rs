//! Error type for `sanya-store-csv`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The file exists but is not valid delimited text.
  #[error("cannot parse {file}: {source}")]
  Csv {
    file:   &'static str,
    #[source]
    source: sanya_csv::Error,
  },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
