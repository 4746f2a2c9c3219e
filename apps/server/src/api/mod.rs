//! API endpoints.

pub mod playdate;
pub mod profile;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use playdates::PlaydateStore;

use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

/// Creates the API router with all endpoints.
///
/// Everything under `/api` requires a bearer token.
pub fn create_router<S: PlaydateStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let api = Router::new()
        // Profile endpoints
        .route("/api/profile/register", post(profile::register))
        .route("/api/profile/me", post(profile::me))
        .route("/api/profile/update", post(profile::update))
        .route("/api/profile/add-child", post(profile::add_child))
        .route("/api/profile/remove-child", post(profile::remove_child))
        // Playdate endpoints
        .route("/api/playdate/create", post(playdate::create))
        .route("/api/playdate/get", post(playdate::get))
        .route("/api/playdate/list-for-day", post(playdate::list_for_day))
        .route("/api/playdate/update", post(playdate::update))
        .route("/api/playdate/delete", post(playdate::delete))
        .route("/api/playdate/join", post(playdate::join))
        .route("/api/playdate/stats", post(playdate::stats))
        .route(
            "/api/playdate/refresh-snapshots",
            post(playdate::refresh_snapshots),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware::<S>));

    Router::new()
        .merge(api)
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
