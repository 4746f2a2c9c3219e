//! Shared fixtures for the service tests.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use auth::Identity;
use chrono::{DateTime, Utc};
use entities::{
    Coordinates, Location, NewPlaydate, Participant, Playdate, User, UserSnapshot,
};
use playdate_store::{MemoryStore, PlaydateFilter, PlaydateStore, StoreError, StoreResult};
use uuid::Uuid;

use crate::{PlaydateInput, PlaydateService, ServiceConfig};

pub(crate) fn service() -> PlaydateService<MemoryStore> {
    service_with(ServiceConfig::new())
}

pub(crate) fn service_with(config: ServiceConfig) -> PlaydateService<MemoryStore> {
    PlaydateService::new(MemoryStore::new(), config)
}

pub(crate) async fn register<S: PlaydateStore>(
    service: &PlaydateService<S>,
    id: &str,
    name: &str,
) -> User {
    let identity = Identity::new(id, format!("{id}@example.com")).with_name(name);
    service.register_user(&identity).await.unwrap()
}

fn kaivopuisto() -> Location {
    Location::new(
        "Kaivopuisto playground",
        "Puistokatu 1, Helsinki",
        Coordinates::new(60.157, 24.956),
    )
}

pub(crate) fn input(title: &str, date: DateTime<Utc>) -> PlaydateInput {
    PlaydateInput {
        title: title.to_string(),
        description: None,
        location: kaivopuisto(),
        date,
        start_time: "10:00".to_string(),
        end_time: "12:00".to_string(),
        max_participants: None,
        min_age: None,
        max_age: None,
    }
}

/// A stored-looking playdate for the pure helpers.
pub(crate) fn playdate(title: &str) -> Playdate {
    Playdate::from_new(
        Uuid::new_v4(),
        NewPlaydate {
            title: title.to_string(),
            description: None,
            organizer_id: "org".to_string(),
            organizer: UserSnapshot::new("org", "org@example.com", "Olli"),
            location: kaivopuisto(),
            date: Utc::now(),
            start_time: String::new(),
            end_time: String::new(),
            participants: Vec::new(),
            max_participants: None,
            age_range: Default::default(),
        },
    )
}

/// Memory store that can stall every call, lose conditional writes or hide
/// existing users from reads.
#[derive(Default)]
pub(crate) struct FaultyStore {
    inner: MemoryStore,
    delay_ms: AtomicU64,
    conflicts: AtomicU32,
    hidden_user_reads: AtomicU32,
}

impl FaultyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before reaching the inner store.
    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(Some(delay));
        self
    }

    /// Changes the stall applied to calls made from now on.
    pub(crate) fn set_delay(&self, delay: Option<Duration>) {
        let millis = delay.map_or(0, |d| d.as_millis() as u64);
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    /// The next `count` user reads report no user, as if another writer had
    /// not landed yet.
    pub(crate) fn hide_users(&self, count: u32) {
        self.hidden_user_reads.store(count, Ordering::SeqCst);
    }

    /// The next `count` conditional writes fail with a version mismatch.
    pub(crate) fn with_conflicts(self, count: u32) -> Self {
        self.conflicts.store(count, Ordering::SeqCst);
        self
    }

    async fn stall(&self) {
        let millis = self.delay_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }

    fn take(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn lose_race(&self, entity_type: &'static str, id: &str, version: u64) -> StoreResult<()> {
        if Self::take(&self.conflicts) {
            return Err(StoreError::version_mismatch(entity_type, id, version, version + 1));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaydateStore for FaultyStore {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        self.stall().await;
        self.inner.create_user(user).await
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.stall().await;
        if Self::take(&self.hidden_user_reads) {
            return Ok(None);
        }
        self.inner.get_user(id).await
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        self.stall().await;
        self.lose_race("User", &user.id, user.version)?;
        self.inner.update_user(user).await
    }

    async fn create_playdate(&self, playdate: NewPlaydate) -> StoreResult<Playdate> {
        self.stall().await;
        self.inner.create_playdate(playdate).await
    }

    async fn get_playdate(&self, id: Uuid) -> StoreResult<Option<Playdate>> {
        self.stall().await;
        self.inner.get_playdate(id).await
    }

    async fn list_playdates(&self, filter: &PlaydateFilter) -> StoreResult<Vec<Playdate>> {
        self.stall().await;
        self.inner.list_playdates(filter).await
    }

    async fn update_playdate(&self, playdate: Playdate) -> StoreResult<Playdate> {
        self.stall().await;
        self.lose_race("Playdate", &playdate.id.to_string(), playdate.version)?;
        self.inner.update_playdate(playdate).await
    }

    async fn replace_participants(
        &self,
        id: Uuid,
        expected_version: u64,
        participants: Vec<Participant>,
    ) -> StoreResult<Playdate> {
        self.stall().await;
        self.lose_race("Playdate", &id.to_string(), expected_version)?;
        self.inner
            .replace_participants(id, expected_version, participants)
            .await
    }

    async fn delete_playdate(&self, id: Uuid) -> StoreResult<()> {
        self.stall().await;
        self.inner.delete_playdate(id).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_faulty_store_stalls_profile_reads() {
    let service = PlaydateService::new(
        FaultyStore::new().with_delay(Duration::from_secs(10)),
        ServiceConfig::new(),
    );
    let result = service.get_profile("u1").await;
    assert!(matches!(result, Err(crate::PlaydateError::Unavailable(_))));
}
