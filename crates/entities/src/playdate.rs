//! Playdate entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserSnapshot;

/// Age range used when the organizer leaves it blank.
pub const DEFAULT_AGE_RANGE: AgeRange = AgeRange { min: 0, max: 10 };

/// Geographic coordinates of a meeting place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both components are within their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Where a playdate takes place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Short place name (e.g. a park).
    pub name: String,
    /// Street address.
    pub address: String,
    /// Map coordinates.
    pub coordinates: Coordinates,
}

impl Location {
    /// Creates a location.
    pub fn new(name: impl Into<String>, address: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coordinates,
        }
    }
}

/// Inclusive range of child ages a playdate is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    /// Youngest age.
    pub min: u32,
    /// Oldest age.
    pub max: u32,
}

impl Default for AgeRange {
    fn default() -> Self {
        DEFAULT_AGE_RANGE
    }
}

impl AgeRange {
    /// Creates an age range.
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// A join record linking a user to a playdate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Joining user's ID.
    pub user_id: String,
    /// Snapshot of the joining user, supplied by the caller.
    pub user: UserSnapshot,
    /// How many of the user's children attend.
    pub children_count: u32,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Creates a participant joining now.
    pub fn new(user_id: impl Into<String>, user: UserSnapshot, children_count: u32) -> Self {
        Self {
            user_id: user_id.into(),
            user,
            children_count,
            joined_at: Utc::now(),
        }
    }
}

/// Fields supplied when creating a playdate. The store assigns the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlaydate {
    /// Title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Organizer's user ID.
    pub organizer_id: String,
    /// Organizer snapshot taken at creation.
    pub organizer: UserSnapshot,
    /// Meeting place.
    pub location: Location,
    /// When the playdate happens.
    pub date: DateTime<Utc>,
    /// Start time as entered (not validated).
    pub start_time: String,
    /// End time as entered (not validated).
    pub end_time: String,
    /// Initial participants. Normally empty.
    pub participants: Vec<Participant>,
    /// Optional participant cap.
    pub max_participants: Option<u32>,
    /// Target age range.
    pub age_range: AgeRange,
}

/// A scheduled playdate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playdate {
    /// Unique identifier assigned by the store.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Organizer's user ID.
    pub organizer_id: String,
    /// Organizer snapshot taken at creation. Not kept in sync.
    pub organizer: UserSnapshot,
    /// Meeting place.
    pub location: Location,
    /// When the playdate happens.
    pub date: DateTime<Utc>,
    /// Start time as entered.
    pub start_time: String,
    /// End time as entered.
    pub end_time: String,
    /// Joined participants, in join order.
    pub participants: Vec<Participant>,
    /// Optional participant cap.
    pub max_participants: Option<u32>,
    /// Target age range.
    pub age_range: AgeRange,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
    /// Store-managed revision, bumped on every successful write.
    #[serde(default)]
    pub version: u64,
}

impl Playdate {
    /// Materializes a new playdate under the given store-assigned ID.
    pub fn from_new(id: Uuid, new: NewPlaydate) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new.title,
            description: new.description,
            organizer_id: new.organizer_id,
            organizer: new.organizer,
            location: new.location,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            participants: new.participants,
            max_participants: new.max_participants,
            age_range: new.age_range,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Returns the participant entry for `user_id`, if any.
    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }
}
