//! Core entity definitions for the playdate directory.
//!
//! This crate defines the data types shared by the store, the service layer
//! and the HTTP server: users and their children, playdates with their
//! location and participant roster, and the denormalized snapshots copied
//! between them.

mod playdate;
mod role;
mod user;

pub use playdate::*;
pub use role::*;
pub use user::*;
