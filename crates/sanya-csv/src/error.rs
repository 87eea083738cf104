//! Error types for the sanya-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A quoted field was opened but the input ended before it was closed.
  #[error("unterminated quoted field in record starting on line {line}")]
  UnterminatedQuote { line: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
