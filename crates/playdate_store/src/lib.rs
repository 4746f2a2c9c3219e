//! Document storage for the playdate directory.
//!
//! This crate provides the storage abstraction the service layer talks to.
//! Every document carries a version stamp; updates are conditioned on the
//! version the caller read, so read-modify-write cycles never silently
//! overwrite a concurrent writer. An in-memory store backs tests and
//! single-process use, and SQLite backs persistent deployments.

mod error;
mod memory;
#[cfg(not(any(target_os = "android", target_os = "ios")))]
mod sqlite;
mod store;

pub use error::*;
pub use memory::*;
#[cfg(not(any(target_os = "android", target_os = "ios")))]
pub use sqlite::*;
pub use store::*;
