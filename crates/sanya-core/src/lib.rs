//! Core types and services for the Sanya promise tracker.
//!
//! This crate is free of HTTP and filesystem dependencies. Entities map onto
//! tables through [`record::Record`]; persistence goes through the
//! [`store::TableStore`] port, implemented by `sanya-store-csv`.

pub mod accounts;
pub mod error;
pub mod politician;
pub mod promise;
pub mod record;
pub mod store;
pub mod tracker;
pub mod user;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
