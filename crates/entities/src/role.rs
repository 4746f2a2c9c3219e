//! Per-playdate roles and derived statistics.

use serde::{Deserialize, Serialize};

/// A user's relationship to a particular playdate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Created the playdate.
    Organizer,
    /// Has joined the playdate.
    Participant,
    /// Neither organizer nor participant.
    #[default]
    Guest,
}

impl Role {
    /// Returns true if this user may edit or delete the playdate.
    pub fn can_manage(&self) -> bool {
        matches!(self, Self::Organizer)
    }
}

/// Aggregates derived from a playdate's participant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlaydateStats {
    /// Number of joined families.
    pub family_count: u32,
    /// Total children across all joined families.
    pub children_count: u32,
}
