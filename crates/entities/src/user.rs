//! User-related entity definitions.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Oldest age accepted for a child on a roster.
pub const MAX_CHILD_AGE: u32 = 18;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier assigned by the identity provider.
    pub id: String,
    /// Email address. Fixed at registration.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Children on this user's roster, in insertion order.
    pub children: Vec<Child>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Store-managed revision, bumped on every successful write.
    #[serde(default)]
    pub version: u64,
}

impl User {
    /// Creates a new user with an empty child roster.
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            phone_number: None,
            children: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Takes a point-in-time copy of this user for embedding in playdates.
    pub fn snapshot(&self) -> UserSnapshot {
        UserSnapshot {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            children_count: u32::try_from(self.children.len()).unwrap_or(u32::MAX),
        }
    }
}

/// A child on a user's roster. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    /// Child's name.
    pub name: String,
    /// Age in whole years.
    pub age: u32,
    /// Approximate date of birth: the creation date minus `age` years.
    pub date_of_birth: NaiveDate,
}

impl Child {
    /// Creates a child record, deriving the date of birth from `today`.
    pub fn new(name: impl Into<String>, age: u32, today: NaiveDate) -> Self {
        let date_of_birth = today
            .checked_sub_months(Months::new(age.saturating_mul(12)))
            .unwrap_or(today);
        Self {
            name: name.into(),
            age,
            date_of_birth,
        }
    }
}

/// Denormalized copy of a user's public fields.
///
/// Snapshots are written once and are not kept in sync with later profile
/// edits. Callers that need current data refresh them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserSnapshot {
    /// User ID.
    pub id: String,
    /// Email at snapshot time.
    pub email: String,
    /// Display name at snapshot time.
    pub name: String,
    /// Number of children on the roster at snapshot time.
    pub children_count: u32,
}

impl UserSnapshot {
    /// Creates a snapshot from bare identity fields, with no roster data.
    pub fn new(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            children_count: 0,
        }
    }
}
