//! Playdate directory and participation endpoints.

use std::sync::Arc;

use auth::Identity;
use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use chrono_tz::Tz;
use entities::{Playdate, PlaydateStats, UserSnapshot};
use playdates::{children_count, PlaydateError, PlaydateInput, PlaydateStore, PlaydateView};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaydateIdRequest {
    pub playdate_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListForDayRequest {
    /// Calendar day. Defaults to today in `timezone`.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// IANA zone name. Defaults to the server's zone.
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaydateRequest {
    pub playdate_id: Uuid,
    #[serde(flatten)]
    pub input: PlaydateInput,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub playdate_id: Uuid,
    pub children_count: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaydateResponse {
    pub playdate: Playdate,
}

#[derive(Debug, Serialize)]
pub struct ListPlaydatesResponse {
    pub date: NaiveDate,
    pub playdates: Vec<Playdate>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {}

pub async fn create<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<PlaydateInput>,
) -> ServerResult<Json<PlaydateResponse>> {
    let playdate = state.service.create_playdate(&identity.id, input).await?;
    Ok(Json(PlaydateResponse { playdate }))
}

/// Returns the playdate with its stats and the caller's role.
pub async fn get<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<PlaydateIdRequest>,
) -> ServerResult<Json<PlaydateView>> {
    let view = state
        .service
        .get_playdate_view(request.playdate_id, &identity.id)
        .await?;
    Ok(Json(view))
}

pub async fn list_for_day<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<ListForDayRequest>,
) -> ServerResult<Json<ListPlaydatesResponse>> {
    let tz = match request.timezone.as_deref() {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| ServerError::InvalidRequest(format!("Unknown timezone: {name}")))?,
        None => state.config.timezone,
    };
    let date = request.date.unwrap_or_else(|| playdates::today_in(&tz));

    let playdates = state.service.list_playdates_for_day(date, &tz).await?;
    Ok(Json(ListPlaydatesResponse { date, playdates }))
}

pub async fn update<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<UpdatePlaydateRequest>,
) -> ServerResult<Json<PlaydateResponse>> {
    let playdate = state
        .service
        .update_playdate(&identity.id, request.playdate_id, request.input)
        .await?;
    Ok(Json(PlaydateResponse { playdate }))
}

pub async fn delete<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<PlaydateIdRequest>,
) -> ServerResult<Json<DeleteResponse>> {
    state
        .service
        .delete_playdate(&identity.id, request.playdate_id)
        .await?;
    Ok(Json(DeleteResponse {}))
}

/// Joins the caller to a playdate, snapshotting their current profile.
pub async fn join<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<JoinRequest>,
) -> ServerResult<Json<PlaydateView>> {
    let count = children_count(request.children_count)?;
    let snapshot = match state.service.get_profile(&identity.id).await {
        Ok(user) => user.snapshot(),
        Err(PlaydateError::NotFound { .. }) => {
            UserSnapshot::new(&identity.id, &identity.email, identity.display_name())
        }
        Err(e) => return Err(e.into()),
    };

    let playdate = state
        .service
        .join(request.playdate_id, &identity.id, count, snapshot)
        .await?;
    Ok(Json(PlaydateView::new(playdate, &identity.id)))
}

pub async fn stats<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<PlaydateIdRequest>,
) -> ServerResult<Json<PlaydateStats>> {
    let stats = state.service.playdate_stats(request.playdate_id).await?;
    Ok(Json(stats))
}

pub async fn refresh_snapshots<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<PlaydateIdRequest>,
) -> ServerResult<Json<PlaydateResponse>> {
    let playdate = state.service.refresh_snapshots(request.playdate_id).await?;
    Ok(Json(PlaydateResponse { playdate }))
}
