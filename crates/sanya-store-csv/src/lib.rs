//! Flat-file backend for the Sanya promise tracker.
//!
//! Each table is one comma-delimited file with a header row, kept under a
//! single data directory. Files are read and rewritten whole through
//! [`tokio::fs`].

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::CsvStore;
