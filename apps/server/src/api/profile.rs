//! Profile and child roster endpoints.

use std::sync::Arc;

use auth::Identity;
use axum::{extract::State, Extension, Json};
use entities::User;
use playdates::{PlaydateError, PlaydateStore, ProfileUpdate};
use serde::{Deserialize, Serialize};

use crate::error::ServerResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddChildRequest {
    pub name: String,
    pub age: i64,
}

#[derive(Debug, Deserialize)]
pub struct RemoveChildRequest {
    pub index: i64,
}

/// Creates the caller's profile if it does not exist yet.
pub async fn register<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
) -> ServerResult<Json<ProfileResponse>> {
    let user = state.service.register_user(&identity).await?;
    Ok(Json(ProfileResponse { user }))
}

/// Returns the caller's profile.
pub async fn me<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
) -> ServerResult<Json<ProfileResponse>> {
    let user = state.service.get_profile(&identity.id).await?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn update<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<UpdateProfileRequest>,
) -> ServerResult<Json<ProfileResponse>> {
    let update = ProfileUpdate {
        name: request.name,
        phone_number: request.phone_number,
    };
    let user = state.service.update_profile(&identity.id, update).await?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn add_child<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<AddChildRequest>,
) -> ServerResult<Json<ProfileResponse>> {
    let age = u32::try_from(request.age)
        .map_err(|_| PlaydateError::validation("Age must be between 0 and 18"))?;
    let user = state
        .service
        .add_child(&identity.id, &request.name, age)
        .await?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn remove_child<S: PlaydateStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<RemoveChildRequest>,
) -> ServerResult<Json<ProfileResponse>> {
    let user = state
        .service
        .remove_child(&identity.id, request.index)
        .await?;
    Ok(Json(ProfileResponse { user }))
}
