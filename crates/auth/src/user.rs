//! Identity types

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID assigned by the provider
    pub id: String,

    /// Email address
    pub email: String,

    /// Display name (if the provider has one)
    pub name: Option<String>,
}

impl Identity {
    /// Creates a new identity
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
        }
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the display name, falling back to email
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_display_name() {
        let identity = Identity::new("user-123", "test@example.com");
        assert_eq!(identity.display_name(), "test@example.com");

        let named = Identity::new("user-123", "test@example.com").with_name("Test User");
        assert_eq!(named.display_name(), "Test User");

        let blank = Identity::new("user-123", "test@example.com").with_name("  ");
        assert_eq!(blank.display_name(), "test@example.com");
    }
}
