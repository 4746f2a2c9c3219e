//! Service error types.

use playdate_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the playdate services.
///
/// Every variant displays as a short message suitable for showing to a user.
#[derive(Debug, Error)]
pub enum PlaydateError {
    /// Malformed input: empty required field, out-of-range value.
    #[error("{0}")]
    Validation(String),

    /// Referenced playdate or user does not exist.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The user is already on the participant list.
    #[error("You have already joined this playdate")]
    AlreadyJoined { playdate_id: Uuid, user_id: String },

    /// A conditional write kept losing to concurrent writers.
    #[error("The record was changed by someone else, please try again")]
    Conflict(String),

    /// The store could not be reached or did not answer in time.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Child removal by an invalid position.
    #[error("No child at position {index} (roster has {len})")]
    IndexOutOfRange { index: i64, len: usize },

    /// The playdate has reached its participant cap.
    #[error("This playdate is full ({max} participants)")]
    Full { max: u32 },

    /// No identity is signed in.
    #[error("You need to sign in first")]
    NotSignedIn,

    /// The caller is not allowed to perform the action.
    #[error("Only the organizer can {0}")]
    Forbidden(&'static str),

    /// Other storage failure.
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl PlaydateError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Returns true if a create collided with an existing record.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::Store(StoreError::AlreadyExists { .. }))
    }
}

impl From<StoreError> for PlaydateError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            StoreError::VersionMismatch { .. } => Self::Conflict(e.to_string()),
            StoreError::Unavailable(reason) => Self::Unavailable(reason),
            other => Self::Store(other),
        }
    }
}

/// Result type for service operations.
pub type PlaydateResult<T> = Result<T, PlaydateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_service_errors() {
        let not_found: PlaydateError = StoreError::not_found("Playdate", "abc").into();
        assert!(matches!(not_found, PlaydateError::NotFound { entity_type: "Playdate", .. }));

        let conflict: PlaydateError = StoreError::version_mismatch("User", "u1", 1, 2).into();
        assert!(matches!(conflict, PlaydateError::Conflict(_)));

        let unavailable: PlaydateError = StoreError::Unavailable("down".to_string()).into();
        assert!(matches!(unavailable, PlaydateError::Unavailable(_)));

        let other: PlaydateError = StoreError::Other("boom".to_string()).into();
        assert!(matches!(other, PlaydateError::Store(_)));
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = PlaydateError::IndexOutOfRange { index: 3, len: 1 };
        assert_eq!(err.to_string(), "No child at position 3 (roster has 1)");

        let err = PlaydateError::Forbidden("delete this playdate");
        assert_eq!(err.to_string(), "Only the organizer can delete this playdate");
    }
}
