//! In-memory store implementation for testing and single-process use.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use entities::{NewPlaydate, Participant, Playdate, User};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{PlaydateFilter, PlaydateStore, SortOrder, StoreError, StoreResult};

/// In-memory document store.
///
/// Each operation holds the collection lock for its whole duration, so
/// conditional writes are atomic with respect to each other.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    playdates: RwLock<HashMap<Uuid, Playdate>>,
}

impl MemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlaydateStore for MemoryStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, mut user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::already_exists("User", user.id));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::already_exists("User", user.email));
        }
        user.version = 1;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn update_user(&self, mut user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let current = users
            .get(&user.id)
            .ok_or_else(|| StoreError::not_found("User", user.id.clone()))?;
        if current.version != user.version {
            return Err(StoreError::version_mismatch(
                "User",
                user.id,
                user.version,
                current.version,
            ));
        }
        user.version += 1;
        user.updated_at = Utc::now();
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    // =========================================================================
    // Playdate operations
    // =========================================================================

    async fn create_playdate(&self, playdate: NewPlaydate) -> StoreResult<Playdate> {
        let mut playdates = self.playdates.write().await;
        let playdate = Playdate::from_new(Uuid::new_v4(), playdate);
        playdates.insert(playdate.id, playdate.clone());
        Ok(playdate)
    }

    async fn get_playdate(&self, id: Uuid) -> StoreResult<Option<Playdate>> {
        let playdates = self.playdates.read().await;
        Ok(playdates.get(&id).cloned())
    }

    async fn list_playdates(&self, filter: &PlaydateFilter) -> StoreResult<Vec<Playdate>> {
        let playdates = self.playdates.read().await;
        let mut result: Vec<Playdate> = playdates
            .values()
            .filter(|p| filter.date_range.is_none_or(|range| range.contains(p.date)))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        if filter.order == SortOrder::Descending {
            result.reverse();
        }

        Ok(result)
    }

    async fn update_playdate(&self, mut playdate: Playdate) -> StoreResult<Playdate> {
        let mut playdates = self.playdates.write().await;
        let current = playdates
            .get(&playdate.id)
            .ok_or_else(|| StoreError::not_found("Playdate", playdate.id.to_string()))?;
        if current.version != playdate.version {
            return Err(StoreError::version_mismatch(
                "Playdate",
                playdate.id.to_string(),
                playdate.version,
                current.version,
            ));
        }
        playdate.version += 1;
        playdate.updated_at = Utc::now();
        playdates.insert(playdate.id, playdate.clone());
        Ok(playdate)
    }

    async fn replace_participants(
        &self,
        id: Uuid,
        expected_version: u64,
        participants: Vec<Participant>,
    ) -> StoreResult<Playdate> {
        let mut playdates = self.playdates.write().await;
        let playdate = playdates
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Playdate", id.to_string()))?;
        if playdate.version != expected_version {
            return Err(StoreError::version_mismatch(
                "Playdate",
                id.to_string(),
                expected_version,
                playdate.version,
            ));
        }
        playdate.participants = participants;
        playdate.version += 1;
        playdate.updated_at = Utc::now();
        Ok(playdate.clone())
    }

    async fn delete_playdate(&self, id: Uuid) -> StoreResult<()> {
        let mut playdates = self.playdates.write().await;
        if playdates.remove(&id).is_none() {
            return Err(StoreError::not_found("Playdate", id.to_string()));
        }
        Ok(())
    }
}
