//! Server configuration.

use std::env;
use std::time::Duration;

use chrono_tz::Tz;
use playdates::{CapacityPolicy, ServiceConfig, DEFAULT_MAX_WRITE_ATTEMPTS, DEFAULT_STORE_TIMEOUT};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL. In-memory storage is used when unset.
    pub database_url: Option<String>,
    /// Secret used to validate bearer tokens.
    pub jwt_secret: String,
    /// Expected token issuer.
    pub jwt_issuer: String,
    /// Log level.
    pub log_level: String,
    /// Zone used to resolve "today" when a request names no zone.
    pub timezone: Tz,
    /// Deadline for each store call.
    pub store_timeout: Duration,
    /// Attempts for version-conditioned writes.
    pub max_write_attempts: u32,
    /// Reject joins past `max_participants`.
    pub enforce_capacity: bool,
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("PLAYDATES_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("PLAYDATES_JWT_SECRET is required"))?;

        let timezone = match env::var("PLAYDATES_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("Invalid PLAYDATES_TIMEZONE: {e}"))?,
            Err(_) => Tz::UTC,
        };

        Ok(Self {
            host: env::var("PLAYDATES_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PLAYDATES_SERVER_PORT", 8080),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            jwt_issuer: env::var("PLAYDATES_JWT_ISSUER")
                .unwrap_or_else(|_| auth::DEFAULT_JWT_ISSUER.to_string()),
            log_level: env::var("PLAYDATES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            timezone,
            store_timeout: Duration::from_millis(parse_or(
                "PLAYDATES_STORE_TIMEOUT_MS",
                DEFAULT_STORE_TIMEOUT.as_millis() as u64,
            )),
            max_write_attempts: parse_or("PLAYDATES_MAX_JOIN_ATTEMPTS", DEFAULT_MAX_WRITE_ATTEMPTS),
            enforce_capacity: env::var("PLAYDATES_ENFORCE_CAPACITY")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        })
    }

    /// Creates a configuration for tests and embedding.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            jwt_issuer: auth::DEFAULT_JWT_ISSUER.to_string(),
            log_level: "info".to_string(),
            timezone: Tz::UTC,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
            enforce_capacity: false,
        }
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the service configuration.
    pub fn service_config(&self) -> ServiceConfig {
        let policy = if self.enforce_capacity {
            CapacityPolicy::HardCap
        } else {
            CapacityPolicy::Unenforced
        };
        ServiceConfig::new()
            .with_store_timeout(self.store_timeout)
            .with_max_write_attempts(self.max_write_attempts)
            .with_capacity_policy(policy)
    }
}
