//! User account and channel routes

use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::user::{RegisterUser, ReplaceImage, UpdateAccount, User};
use crate::state::AppState;
use crate::validation::{check, validate_required};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current", get(current_user))
        .route("/account", patch(update_account))
        .route("/avatar", patch(update_avatar))
        .route("/cover", patch(update_cover))
        .route("/c/:username", get(channel_profile))
        .route("/history", get(watch_history))
}

/// Register a new user. The only unauthenticated mutation in the system;
/// mounted outside the protected router.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> ApiResult<Envelope<User>> {
    check(payload.validate())?;

    if state
        .users
        .find_by_username_or_email(&payload.username, &payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "User with this email or username already exists".to_string(),
        ));
    }

    let avatar = state
        .assets
        .store(&payload.avatar_file)
        .await
        .ok_or_else(|| ApiError::Upstream(anyhow!("avatar upload failed")))?;

    // The cover is optional and its upload is allowed to fail silently.
    let cover_url = match payload.cover_file.as_deref() {
        Some(path) => state.assets.store(path).await.map(|asset| asset.url),
        None => None,
    };

    let user = state.users.create(&payload, avatar.url, cover_url).await?;

    Ok(Envelope::ok(
        StatusCode::CREATED,
        user,
        "User registered successfully",
    ))
}

async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Envelope<User>> {
    let user = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        user,
        "Current user fetched successfully",
    ))
}

async fn update_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateAccount>,
) -> ApiResult<Envelope<User>> {
    check(payload.validate())?;

    let user = state
        .users
        .update_account(auth.id, &payload.display_name, &payload.email)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        user,
        "Account details updated successfully",
    ))
}

async fn update_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ReplaceImage>,
) -> ApiResult<Envelope<User>> {
    if let Err(violation) = validate_required("Image file", &payload.image_file) {
        return Err(ApiError::Validation(vec![violation]));
    }

    let previous = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let stored = state
        .assets
        .store(&payload.image_file)
        .await
        .ok_or_else(|| ApiError::Upstream(anyhow!("avatar upload failed")))?;

    let user = state
        .users
        .set_avatar(auth.id, &stored.url)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    // Best-effort cleanup of the replaced asset
    state.assets.remove(&previous.avatar_url).await;

    Ok(Envelope::ok(
        StatusCode::OK,
        user,
        "Avatar updated successfully",
    ))
}

async fn update_cover(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ReplaceImage>,
) -> ApiResult<Envelope<User>> {
    if let Err(violation) = validate_required("Image file", &payload.image_file) {
        return Err(ApiError::Validation(vec![violation]));
    }

    let previous = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let stored = state
        .assets
        .store(&payload.image_file)
        .await
        .ok_or_else(|| ApiError::Upstream(anyhow!("cover upload failed")))?;

    let user = state
        .users
        .set_cover(auth.id, &stored.url)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if let Some(old) = previous.cover_url {
        state.assets.remove(&old).await;
    }

    Ok(Envelope::ok(
        StatusCode::OK,
        user,
        "Cover image updated successfully",
    ))
}

async fn channel_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> ApiResult<Envelope<Value>> {
    if username.trim().is_empty() {
        return Err(ApiError::Validation(vec!["Username is required".to_string()]));
    }

    let profile = state
        .users
        .channel_profile(&username, auth.id)
        .await?
        .ok_or(ApiError::NotFound("Channel"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        profile,
        "Channel profile fetched successfully",
    ))
}

async fn watch_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<Value>>> {
    let history = state.users.watch_history(auth.id).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        history,
        "Watch history fetched successfully",
    ))
}
