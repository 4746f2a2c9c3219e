//! Creating, editing and deleting playdates.

use chrono::{DateTime, Utc};
use entities::{AgeRange, Location, NewPlaydate, Playdate};
use playdate_store::PlaydateStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{role_of, validation, PlaydateError, PlaydateResult, PlaydateService};

/// Organizer-supplied playdate fields, used for both create and edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaydateInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Location,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub max_participants: Option<u32>,
    /// Defaults to 0 when absent.
    #[serde(default)]
    pub min_age: Option<u32>,
    /// Defaults to 10 when absent.
    #[serde(default)]
    pub max_age: Option<u32>,
}

/// Input after validation and defaulting.
struct ValidInput {
    title: String,
    description: Option<String>,
    location: Location,
    date: DateTime<Utc>,
    start_time: String,
    end_time: String,
    max_participants: Option<u32>,
    age_range: AgeRange,
}

impl PlaydateInput {
    fn validate(&self) -> PlaydateResult<ValidInput> {
        let location = Location::new(
            validation::required("Location name", &self.location.name)?,
            validation::required("Address", &self.location.address)?,
            validation::coordinates(self.location.coordinates)?,
        );
        Ok(ValidInput {
            title: validation::required("Title", &self.title)?,
            description: validation::optional(self.description.as_deref()),
            location,
            date: self.date,
            start_time: self.start_time.trim().to_string(),
            end_time: self.end_time.trim().to_string(),
            max_participants: validation::max_participants(self.max_participants)?,
            age_range: validation::age_range(self.min_age, self.max_age)?,
        })
    }
}

impl<S: PlaydateStore> PlaydateService<S> {
    /// Creates a playdate organized by `organizer_id`.
    ///
    /// The organizer's profile is copied into the playdate as a snapshot. The
    /// organizer is not added as a participant.
    pub async fn create_playdate(
        &self,
        organizer_id: &str,
        input: PlaydateInput,
    ) -> PlaydateResult<Playdate> {
        let valid = input.validate()?;
        let organizer = self.get_profile(organizer_id).await?;

        let new = NewPlaydate {
            title: valid.title,
            description: valid.description,
            organizer_id: organizer.id.clone(),
            organizer: organizer.snapshot(),
            location: valid.location,
            date: valid.date,
            start_time: valid.start_time,
            end_time: valid.end_time,
            participants: Vec::new(),
            max_participants: valid.max_participants,
            age_range: valid.age_range,
        };
        let created = self
            .store_call("create_playdate", self.store.create_playdate(new))
            .await?;

        tracing::info!(
            playdate_id = %created.id,
            organizer_id,
            date = %created.date,
            "Created playdate"
        );
        Ok(created)
    }

    pub async fn get_playdate(&self, playdate_id: Uuid) -> PlaydateResult<Playdate> {
        self.store_call("get_playdate", self.store.get_playdate(playdate_id))
            .await?
            .ok_or_else(|| PlaydateError::not_found("Playdate", playdate_id.to_string()))
    }

    /// Replaces the editable fields. Only the organizer may edit.
    ///
    /// Participants and the organizer snapshot are left untouched.
    pub async fn update_playdate(
        &self,
        requester_id: &str,
        playdate_id: Uuid,
        input: PlaydateInput,
    ) -> PlaydateResult<Playdate> {
        let input = &input;
        let updated = self
            .retry_on_conflict("update_playdate", || async move {
                let valid = input.validate()?;
                let mut playdate = self.get_playdate(playdate_id).await?;
                if !role_of(&playdate, requester_id).can_manage() {
                    return Err(PlaydateError::Forbidden("edit this playdate"));
                }

                playdate.title = valid.title;
                playdate.description = valid.description;
                playdate.location = valid.location;
                playdate.date = valid.date;
                playdate.start_time = valid.start_time;
                playdate.end_time = valid.end_time;
                playdate.max_participants = valid.max_participants;
                playdate.age_range = valid.age_range;

                self.store_call("update_playdate", self.store.update_playdate(playdate))
                    .await
            })
            .await?;

        tracing::info!(%playdate_id, requester_id, "Updated playdate");
        Ok(updated)
    }

    /// Deletes a playdate. Only the organizer may delete.
    pub async fn delete_playdate(&self, requester_id: &str, playdate_id: Uuid) -> PlaydateResult<()> {
        let playdate = self.get_playdate(playdate_id).await?;
        if !role_of(&playdate, requester_id).can_manage() {
            return Err(PlaydateError::Forbidden("delete this playdate"));
        }

        self.store_call("delete_playdate", self.store.delete_playdate(playdate_id))
            .await?;

        tracing::info!(%playdate_id, requester_id, "Deleted playdate");
        Ok(())
    }

    /// Re-copies organizer and participant snapshots from current profiles.
    ///
    /// Entries whose user no longer has a profile keep their old snapshot.
    pub async fn refresh_snapshots(&self, playdate_id: Uuid) -> PlaydateResult<Playdate> {
        let refreshed = self
            .retry_on_conflict("refresh_snapshots", || async move {
                let mut playdate = self.get_playdate(playdate_id).await?;

                if let Some(organizer) = self
                    .store_call("get_user", self.store.get_user(&playdate.organizer_id))
                    .await?
                {
                    playdate.organizer = organizer.snapshot();
                }
                for participant in &mut playdate.participants {
                    if let Some(user) = self
                        .store_call("get_user", self.store.get_user(&participant.user_id))
                        .await?
                    {
                        participant.user = user.snapshot();
                    }
                }

                self.store_call("update_playdate", self.store.update_playdate(playdate))
                    .await
            })
            .await?;

        tracing::info!(%playdate_id, participants = refreshed.participants.len(), "Refreshed snapshots");
        Ok(refreshed)
    }
}
