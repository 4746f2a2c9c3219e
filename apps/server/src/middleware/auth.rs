//! Authentication middleware.

use std::sync::Arc;

use auth::Identity;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use playdates::PlaydateStore;

use crate::error::ServerError;
use crate::state::AppState;

/// Extracts the bearer token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Validates the bearer token and stores the caller's [`Identity`] in the
/// request extensions.
pub async fn auth_middleware<S: PlaydateStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return ServerError::AuthenticationRequired.into_response();
    };

    match state.jwt_manager.verify_identity(token) {
        Ok(identity) => {
            tracing::debug!(user_id = %identity.id, "Authenticated request");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            ServerError::Auth(e).into_response()
        }
    }
}
