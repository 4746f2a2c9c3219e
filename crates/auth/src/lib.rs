//! Identity provider integration for the playdate directory.
//!
//! Credentials, sessions and token refresh live in an external identity
//! service. This crate provides:
//! - The identity the rest of the system sees (`Identity`)
//! - The `IdentityProvider` contract with an auth-change stream
//! - An in-process session provider fed by sign-in events
//! - Validation of bearer tokens issued by the provider

mod error;
mod jwt;
mod provider;
mod user;

pub use error::*;
pub use jwt::*;
pub use provider::*;
pub use user::*;

/// Default JWT expiration time in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default JWT issuer.
pub const DEFAULT_JWT_ISSUER: &str = "playdates";
