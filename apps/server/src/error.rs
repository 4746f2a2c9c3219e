//! Server error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use playdates::PlaydateError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Error from the playdate services.
    #[error(transparent)]
    Playdate(#[from] PlaydateError),
}

impl ServerError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::AuthenticationRequired | Self::Auth(_) => {
                (StatusCode::UNAUTHORIZED, "authentication_required")
            }
            Self::Playdate(e) => match e {
                PlaydateError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                PlaydateError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
                PlaydateError::AlreadyJoined { .. } => (StatusCode::CONFLICT, "already_joined"),
                PlaydateError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
                PlaydateError::Unavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
                }
                PlaydateError::IndexOutOfRange { .. } => {
                    (StatusCode::BAD_REQUEST, "index_out_of_range")
                }
                PlaydateError::Full { .. } => (StatusCode::CONFLICT, "full"),
                PlaydateError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
                PlaydateError::NotSignedIn => {
                    (StatusCode::UNAUTHORIZED, "authentication_required")
                }
                other if other.is_already_exists() => (StatusCode::CONFLICT, "already_exists"),
                PlaydateError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (PlaydateError::validation("bad"), StatusCode::BAD_REQUEST),
            (PlaydateError::not_found("User", "u1"), StatusCode::NOT_FOUND),
            (PlaydateError::Full { max: 2 }, StatusCode::CONFLICT),
            (PlaydateError::Forbidden("edit"), StatusCode::FORBIDDEN),
            (
                PlaydateError::Unavailable("slow".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ServerError::from(error).parts().0, status);
        }
    }

    #[test]
    fn test_message_passes_through() {
        let error = ServerError::from(PlaydateError::validation("Title is required"));
        assert_eq!(error.to_string(), "Title is required");
    }
}
