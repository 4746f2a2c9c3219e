//! Store trait and query types

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entities::{NewPlaydate, Participant, Playdate, User};
use uuid::Uuid;

use crate::StoreResult;

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a date range.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Sort direction on the playdate date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Earliest first
    #[default]
    Ascending,
    /// Latest first
    Descending,
}

/// Filter options for listing playdates
#[derive(Debug, Clone, Default)]
pub struct PlaydateFilter {
    /// Only playdates whose date falls in this window
    pub date_range: Option<DateRange>,
    /// Ordering on the date field
    pub order: SortOrder,
}

impl PlaydateFilter {
    /// Creates an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to a date window
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Sets the sort order
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// Trait for document storage operations.
///
/// Every write is atomic per document. Updates are conditioned on the
/// `version` carried by the value being written and fail with
/// [`StoreError::VersionMismatch`](crate::StoreError::VersionMismatch) when
/// the stored document has moved on. Successful writes return the document
/// with its new version.
#[async_trait]
pub trait PlaydateStore: Send + Sync {
    // ========== User Operations ==========

    /// Creates a new user
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Replaces a user, conditioned on `user.version`
    async fn update_user(&self, user: User) -> StoreResult<User>;

    // ========== Playdate Operations ==========

    /// Creates a new playdate and assigns its ID
    async fn create_playdate(&self, playdate: NewPlaydate) -> StoreResult<Playdate>;

    /// Gets a playdate by ID
    async fn get_playdate(&self, id: Uuid) -> StoreResult<Option<Playdate>>;

    /// Lists playdates matching the filter, ordered by date
    async fn list_playdates(&self, filter: &PlaydateFilter) -> StoreResult<Vec<Playdate>>;

    /// Replaces a playdate, conditioned on `playdate.version`
    async fn update_playdate(&self, playdate: Playdate) -> StoreResult<Playdate>;

    /// Replaces a playdate's participant list, conditioned on `expected_version`
    async fn replace_participants(
        &self,
        id: Uuid,
        expected_version: u64,
        participants: Vec<Participant>,
    ) -> StoreResult<Playdate>;

    /// Deletes a playdate
    async fn delete_playdate(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
impl<T: PlaydateStore + ?Sized> PlaydateStore for Arc<T> {
    async fn create_user(&self, user: User) -> StoreResult<User> {
        (**self).create_user(user).await
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        (**self).get_user(id).await
    }

    async fn update_user(&self, user: User) -> StoreResult<User> {
        (**self).update_user(user).await
    }

    async fn create_playdate(&self, playdate: NewPlaydate) -> StoreResult<Playdate> {
        (**self).create_playdate(playdate).await
    }

    async fn get_playdate(&self, id: Uuid) -> StoreResult<Option<Playdate>> {
        (**self).get_playdate(id).await
    }

    async fn list_playdates(&self, filter: &PlaydateFilter) -> StoreResult<Vec<Playdate>> {
        (**self).list_playdates(filter).await
    }

    async fn update_playdate(&self, playdate: Playdate) -> StoreResult<Playdate> {
        (**self).update_playdate(playdate).await
    }

    async fn replace_participants(
        &self,
        id: Uuid,
        expected_version: u64,
        participants: Vec<Participant>,
    ) -> StoreResult<Playdate> {
        (**self)
            .replace_participants(id, expected_version, participants)
            .await
    }

    async fn delete_playdate(&self, id: Uuid) -> StoreResult<()> {
        (**self).delete_playdate(id).await
    }
}
