//! Video routes

use anyhow::anyhow;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use serde_json::Value;
use tracing::warn;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::video::{PublishVideo, UpdateVideo, Video, VideoListParams};
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;
use crate::validation::{check, parse_id};
use crate::views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_videos).post(publish_video))
        .route(
            "/:video_id",
            get(get_video).patch(update_video).delete(delete_video),
        )
        .route("/toggle/publish/:video_id", patch(toggle_publish))
}

async fn list_videos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<VideoListParams>,
) -> ApiResult<Envelope<Page<Value>>> {
    let owner = match params.user_id.as_deref() {
        Some(raw) if !raw.is_empty() => Some(parse_id(raw, "user")?),
        _ => None,
    };
    let sort = views::video_sort(params.sort_by.as_deref(), params.sort_type.as_deref())?;

    let spec = views::video_listing(
        params.query.as_deref().unwrap_or(""),
        owner,
        auth.id,
        sort,
    );
    let page = state
        .videos
        .list(&spec, PageRequest::new(params.page, params.limit))
        .await?;

    Ok(Envelope::ok(
        StatusCode::OK,
        page,
        "Videos fetched successfully",
    ))
}

async fn publish_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<PublishVideo>,
) -> ApiResult<Envelope<Video>> {
    check(payload.validate())?;

    let media = state
        .assets
        .store(&payload.video_file)
        .await
        .ok_or_else(|| ApiError::Upstream(anyhow!("video upload failed")))?;
    let thumbnail = state
        .assets
        .store(&payload.thumbnail_file)
        .await
        .ok_or_else(|| ApiError::Upstream(anyhow!("thumbnail upload failed")))?;

    let video = state
        .videos
        .create(
            auth.id,
            &payload.title,
            &payload.description,
            &media.url,
            &thumbnail.url,
            media.duration_seconds.unwrap_or(0.0),
        )
        .await?;

    Ok(Envelope::ok(
        StatusCode::CREATED,
        video,
        "Video published successfully",
    ))
}

/// Fetch a single video. Unpublished videos are visible to their owner
/// only and are reported as absent to everyone else.
async fn get_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<Envelope<Video>> {
    let id = parse_id(&video_id, "video")?;

    let video = state
        .videos
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;
    if !video.is_published && video.owner_id != auth.id {
        return Err(ApiError::NotFound("Video"));
    }

    // View accounting is best-effort; a failure never blocks the fetch.
    if let Err(e) = state.videos.increment_views(id).await {
        warn!("Failed to count view of {}: {:#}", id, e);
    }
    if let Err(e) = state.users.record_watch(auth.id, id).await {
        warn!("Failed to record watch of {}: {:#}", id, e);
    }

    Ok(Envelope::ok(
        StatusCode::OK,
        video,
        "Video fetched successfully",
    ))
}

async fn update_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
    Json(payload): Json<UpdateVideo>,
) -> ApiResult<Envelope<Video>> {
    let id = parse_id(&video_id, "video")?;
    check(payload.validate())?;

    let existing = state
        .videos
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this video",
        ));
    }

    let new_thumbnail = match payload.thumbnail_file.as_deref() {
        Some(path) => Some(
            state
                .assets
                .store(path)
                .await
                .ok_or_else(|| ApiError::Upstream(anyhow!("thumbnail upload failed")))?,
        ),
        None => None,
    };

    let video = state
        .videos
        .update_details(
            id,
            &payload.title,
            &payload.description,
            new_thumbnail.as_ref().map(|asset| asset.url.as_str()),
        )
        .await?
        .ok_or(ApiError::NotFound("Video"))?;

    if new_thumbnail.is_some() {
        state.assets.remove(&existing.thumbnail_url).await;
    }

    Ok(Envelope::ok(
        StatusCode::OK,
        video,
        "Video updated successfully",
    ))
}

async fn delete_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<Envelope<Video>> {
    let id = parse_id(&video_id, "video")?;

    let existing = state
        .videos
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this video",
        ));
    }

    let video = state
        .videos
        .delete(id)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;

    // Orphaned assets are cleaned up best-effort after the row is gone
    state.assets.remove(&video.media_url).await;
    state.assets.remove(&video.thumbnail_url).await;

    Ok(Envelope::ok(
        StatusCode::OK,
        video,
        "Video deleted successfully",
    ))
}

async fn toggle_publish(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(video_id): Path<String>,
) -> ApiResult<Envelope<Video>> {
    let id = parse_id(&video_id, "video")?;

    let existing = state
        .videos
        .find(id)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;
    if existing.owner_id != auth.id {
        return Err(ApiError::Permission(
            "You do not have permission to modify this video",
        ));
    }

    let video = state
        .videos
        .toggle_publish(id)
        .await?
        .ok_or(ApiError::NotFound("Video"))?;

    Ok(Envelope::ok(
        StatusCode::OK,
        video,
        "Publish status toggled successfully",
    ))
}
