//! Channel dashboard routes, scoped to the authenticated owner

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Router};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::video::Video;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(channel_stats))
        .route("/videos", get(channel_videos))
}

async fn channel_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Envelope<Value>> {
    let stats = state
        .videos
        .channel_stats(auth.id)
        .await?
        .ok_or(ApiError::NotFound("Channel"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        stats,
        "Channel stats fetched successfully",
    ))
}

/// Every video the channel owns, published or not
async fn channel_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<Video>>> {
    let videos = state.videos.by_owner(auth.id).await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        videos,
        "Channel videos fetched successfully",
    ))
}
