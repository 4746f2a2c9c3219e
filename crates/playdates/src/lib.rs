//! Playdate directory, participation and profile services.
//!
//! [`PlaydateService`] wraps a [`PlaydateStore`] and implements:
//! - Directory queries: which playdates happen on a calendar day
//! - Participation: joining exactly once, derived counts, roles
//! - Profile and child roster maintenance
//! - Playdate lifecycle: create, edit, delete, snapshot refresh
//!
//! Every store call runs under a deadline, and every read-modify-write is a
//! version-conditioned write retried a bounded number of times.

mod config;
mod directory;
mod error;
mod lifecycle;
mod participation;
mod profile;
mod validation;

#[cfg(test)]
mod testing;

use std::future::Future;

pub use config::*;
pub use directory::*;
pub use error::*;
pub use lifecycle::*;
pub use participation::*;
pub use playdate_store::PlaydateStore;
pub use profile::*;
pub use validation::{children_count, MAX_CHILDREN_PER_FAMILY};

/// Service facade over a playdate store.
#[derive(Debug)]
pub struct PlaydateService<S> {
    store: S,
    config: ServiceConfig,
}

impl<S: PlaydateStore> PlaydateService<S> {
    /// Creates a service with the given store and configuration.
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Runs one store call under the configured deadline.
    async fn store_call<T, F>(&self, operation: &'static str, call: F) -> PlaydateResult<T>
    where
        F: Future<Output = playdate_store::StoreResult<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, call).await {
            Ok(result) => result.map_err(PlaydateError::from),
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(PlaydateError::Unavailable(format!("{operation} timed out")))
            }
        }
    }

    /// Repeats a read-modify-write cycle while it loses to concurrent writers.
    async fn retry_on_conflict<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt_once: F,
    ) -> PlaydateResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PlaydateResult<T>>,
    {
        let attempts = self.config.max_write_attempts.max(1);
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Err(PlaydateError::Conflict(reason)) if attempt < attempts => {
                    tracing::warn!(operation, attempt, %reason, "Write lost a concurrent update, retrying");
                    attempt += 1;
                }
                Err(PlaydateError::Conflict(reason)) => {
                    tracing::warn!(operation, attempts, %reason, "Giving up after repeated conflicts");
                    return Err(PlaydateError::Conflict(reason));
                }
                result => return result,
            }
        }
    }
}
