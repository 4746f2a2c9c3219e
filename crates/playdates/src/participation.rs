//! Joining playdates and the counts and roles derived from participants.

use entities::{Participant, Playdate, PlaydateStats, Role, UserSnapshot};
use playdate_store::PlaydateStore;
use serde::Serialize;
use uuid::Uuid;

use crate::{validation, CapacityPolicy, PlaydateError, PlaydateResult, PlaydateService};

/// Family and children totals for a playdate. Recomputed on every call.
///
/// Both totals saturate at `u32::MAX`.
pub fn compute_stats(playdate: &Playdate) -> PlaydateStats {
    PlaydateStats {
        family_count: u32::try_from(playdate.participants.len()).unwrap_or(u32::MAX),
        children_count: playdate
            .participants
            .iter()
            .fold(0u32, |total, p| total.saturating_add(p.children_count)),
    }
}

pub fn is_participant(playdate: &Playdate, user_id: &str) -> bool {
    playdate.participant(user_id).is_some()
}

pub fn is_organizer(playdate: &Playdate, user_id: &str) -> bool {
    playdate.organizer_id == user_id
}

/// Computes `user_id`'s role in `playdate`. Organizer wins over participant.
pub fn role_of(playdate: &Playdate, user_id: &str) -> Role {
    if is_organizer(playdate, user_id) {
        Role::Organizer
    } else if is_participant(playdate, user_id) {
        Role::Participant
    } else {
        Role::Guest
    }
}

/// Everything a detail screen needs about one playdate for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct PlaydateView {
    pub playdate: Playdate,
    pub stats: PlaydateStats,
    pub role: Role,
}

impl PlaydateView {
    pub fn new(playdate: Playdate, viewer_id: &str) -> Self {
        Self {
            stats: compute_stats(&playdate),
            role: role_of(&playdate, viewer_id),
            playdate,
        }
    }
}

impl<S: PlaydateStore> PlaydateService<S> {
    /// Loads a playdate together with its stats and the viewer's role.
    pub async fn get_playdate_view(
        &self,
        playdate_id: Uuid,
        viewer_id: &str,
    ) -> PlaydateResult<PlaydateView> {
        let playdate = self.get_playdate(playdate_id).await?;
        Ok(PlaydateView::new(playdate, viewer_id))
    }

    /// Adds `user_id` to the playdate's participants exactly once.
    ///
    /// The participant list is written back conditioned on the version that
    /// was read. Lost races are retried with a fresh read.
    pub async fn join(
        &self,
        playdate_id: Uuid,
        user_id: &str,
        children_count: u32,
        snapshot: UserSnapshot,
    ) -> PlaydateResult<Playdate> {
        let children_count = validation::bounded_children_count(children_count)?;
        let updated = self
            .retry_on_conflict("join", || {
                self.try_join(playdate_id, user_id, children_count, snapshot.clone())
            })
            .await?;

        tracing::info!(
            %playdate_id,
            user_id,
            children_count,
            family_count = updated.participants.len(),
            "User joined playdate"
        );
        Ok(updated)
    }

    async fn try_join(
        &self,
        playdate_id: Uuid,
        user_id: &str,
        children_count: u32,
        snapshot: UserSnapshot,
    ) -> PlaydateResult<Playdate> {
        let playdate = self.get_playdate(playdate_id).await?;

        if is_participant(&playdate, user_id) {
            return Err(PlaydateError::AlreadyJoined {
                playdate_id,
                user_id: user_id.to_string(),
            });
        }

        if let (CapacityPolicy::HardCap, Some(max)) =
            (self.config.capacity_policy, playdate.max_participants)
        {
            if playdate.participants.len() >= max as usize {
                return Err(PlaydateError::Full { max });
            }
        }

        let mut participants = playdate.participants;
        participants.push(Participant::new(user_id, snapshot, children_count));

        self.store_call(
            "replace_participants",
            self.store
                .replace_participants(playdate_id, playdate.version, participants),
        )
        .await
    }

    /// Returns the derived counts for a playdate.
    pub async fn playdate_stats(&self, playdate_id: Uuid) -> PlaydateResult<PlaydateStats> {
        let playdate = self.get_playdate(playdate_id).await?;
        Ok(compute_stats(&playdate))
    }
}
