use axum::{body::Bytes, extract::State, Extension, Json};
use axum_extra::{headers::ContentType, TypedHeader};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::models::profile::{Profile, UpdateProfileRequest};
use crate::services::avatar_storage::validate_upload;
use crate::AppState;

fn profiles(state: &AppState) -> Repository<Profile> {
    Repository::new(state.db.clone())
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Profile>> {
    let profile = profiles(&state).get(&auth_user.actor).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    body.validate()?;
    let profile = profiles(&state).update(&auth_user.actor, &body).await?;
    Ok(Json(profile))
}

/// Raw image body; the `Content-Type` header names the format.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    TypedHeader(content_type): TypedHeader<ContentType>,
    body: Bytes,
) -> AppResult<Json<Profile>> {
    let owner = auth_user.actor.writable_owner("upload avatar")?;
    let content_type = content_type.to_string();
    validate_upload(&content_type, body.len())?;

    let url = state
        .avatars
        .upload(owner, &content_type, body.to_vec())
        .await
        .map_err(AppError::Internal)?;

    let profile = profiles(&state)
        .set_avatar_url(&auth_user.actor, &url)
        .await?;
    Ok(Json(profile))
}
