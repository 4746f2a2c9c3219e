//! Application state.

use std::sync::Arc;

use auth::JwtManager;
use playdates::{PlaydateService, PlaydateStore};

use crate::config::Config;

/// Shared application state.
pub struct AppState<S: PlaydateStore> {
    /// Server configuration.
    pub config: Config,
    /// Playdate services over the configured store.
    pub service: PlaydateService<S>,
    /// Bearer token validation.
    pub jwt_manager: JwtManager,
}

impl<S: PlaydateStore> AppState<S> {
    /// Creates new application state.
    pub fn new(config: Config, store: S, jwt_manager: JwtManager) -> Self {
        let service = PlaydateService::new(store, config.service_config());
        Self {
            config,
            service,
            jwt_manager,
        }
    }
}

/// Type alias for shared state.
pub type SharedState<S> = Arc<AppState<S>>;
