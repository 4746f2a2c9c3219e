//! Service configuration.

use std::time::Duration;

/// Default deadline for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of attempts for a version-conditioned write.
pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// How `max_participants` is treated when a user joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// The cap is informational only.
    #[default]
    Unenforced,
    /// Joins past the cap are rejected with `Full`.
    HardCap,
}

/// Tunables for [`PlaydateService`](crate::PlaydateService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Deadline applied to every store call.
    pub store_timeout: Duration,
    /// Attempts for read-modify-write cycles before giving up with `Conflict`.
    pub max_write_attempts: u32,
    /// Participant cap handling.
    pub capacity_policy: CapacityPolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            capacity_policy: CapacityPolicy::default(),
        }
    }
}

impl ServiceConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the store call deadline.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Sets the attempt budget for conditional writes. Zero is treated as one.
    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    /// Sets the capacity policy.
    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }
}
